//! # pfsense-provider
//!
//! Wires every pfSense resource type onto one authenticated [`Session`], so that all
//! of them serialize through the same connection lock.
//!
//! ```no_run
//! use pfsense_core::{PfsenseConfig, Resource};
//! use pfsense_provider::Provider;
//!
//! # async fn example() -> pfsense_core::Result<()> {
//! let config = PfsenseConfig::new("https://fw.example.com/api/v1", "client", "token")?;
//! let provider = Provider::connect(&config).await?;
//! let state = provider.nat_port_forward().read("wan/0").await?;
//! println!("{} -> {}", state.id, state.record.target);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod provider;

pub use pfsense_core::{PfsenseConfig, Session};
pub use provider::{Provider, RESOURCE_TYPES};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;
