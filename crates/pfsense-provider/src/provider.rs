//! Provider entry point.

use pfsense_alias::AliasResource;
use pfsense_core::{PfsenseConfig, Result, Session};
use pfsense_dhcp::StaticMappingResource;
use pfsense_nat::PortForwardResource;
use tracing::info;

/// Resource type names served by the provider.
pub const RESOURCE_TYPES: [&str; 3] = [
    pfsense_dhcp::RESOURCE_TYPE,
    pfsense_nat::RESOURCE_TYPE,
    pfsense_alias::RESOURCE_TYPE,
];

/// Configured provider holding one appliance session.
#[derive(Clone)]
pub struct Provider {
    session: Session,
}

impl Provider {
    /// Authenticate against the configured appliance.
    ///
    /// # Errors
    ///
    /// Returns [`pfsense_core::Error::ConfigError`] for an unusable base URL and
    /// [`pfsense_core::Error::AuthenticationFailed`] when the token exchange fails.
    pub async fn connect(config: &PfsenseConfig) -> Result<Self> {
        let session = Session::connect(config).await?;
        info!(api_url = %config.api_url, "connected to pfSense");
        Ok(Self::from_session(session))
    }

    /// Use an already established session.
    #[must_use]
    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// The shared session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `pfsense_nat_port_forward` handle.
    #[must_use]
    pub fn nat_port_forward(&self) -> PortForwardResource {
        PortForwardResource::new(&self.session)
    }

    /// `pfsense_dhcp_static_mapping` handle.
    #[must_use]
    pub fn dhcp_static_mapping(&self) -> StaticMappingResource {
        StaticMappingResource::new(&self.session)
    }

    /// `pfsense_alias` handle.
    #[must_use]
    pub fn alias(&self) -> AliasResource {
        AliasResource::new(&self.session)
    }
}
