//! DHCP static mapping resource for the pfSense REST API.
//!
//! Mappings are addressed by interface and MAC address, both of which the appliance
//! can be queried by, so no list reconciliation is needed.

#![deny(missing_docs)]

pub mod models;
pub mod resource;

pub use models::{StaticMapping, StaticMappingId, StaticMappingSpec};
pub use resource::{StaticMappingResource, RESOURCE_TYPE};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;
