//! NAT port-forward reconciliation for the pfSense REST API.
//!
//! The appliance identifies port-forward rules only by their position in the rule
//! list. This crate keeps a declarative identifier `"<interface>/<ordinal>"` aligned
//! with that list by fingerprinting rule contents and re-listing after every write.

#![deny(missing_docs)]

pub mod fingerprint;
pub mod id;
pub mod models;
pub mod repository;
pub mod resource;

pub use fingerprint::Fingerprint;
pub use id::PortForwardId;
pub use models::{
    CreatePortForwardRequest, DeletePortForwardRequest, NatPortForward, PortForwardSpec,
    RuleEndpoint,
};
pub use repository::{PortForwardRepository, PortForwardStore};
pub use resource::{PortForwardResource, RESOURCE_TYPE};

/// Convenient result alias that reuses the shared pfSense error type.
pub type Result<T> = pfsense_core::Result<T>;
