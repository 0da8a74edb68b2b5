//! # pfsense-core
//!
//! Core types and utilities for managing a pfSense appliance through its REST API.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy shared by every resource
//! - [`config`] - Provider configuration
//! - [`client`] - Authenticated HTTP client
//! - [`types`] - Endpoint table and response envelope
//! - [`session`] - Appliance session and connection-wide lock
//! - [`resource`] - Declarative lifecycle trait

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod resource;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use client::{ApiClient, ApiClientBuilder, ClientConfig};
pub use config::PfsenseConfig;
pub use error::{Error, Result};
pub use resource::{Resource, ResourceState};
pub use session::{ConnectionLock, Session};
pub use types::{ApiEndpoint, ApiResponse, ResponseData};
