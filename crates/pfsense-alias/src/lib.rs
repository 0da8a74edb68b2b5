//! Firewall alias resource for the pfSense REST API.

#![deny(missing_docs)]

pub mod models;
pub mod resource;

pub use models::{Alias, AliasSpec, AliasType, AliasValue};
pub use resource::{AliasResource, RESOURCE_TYPE};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;
