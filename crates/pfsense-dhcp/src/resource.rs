//! Lifecycle of the `pfsense_dhcp_static_mapping` resource.

use crate::models::{
    DeleteStaticMappingRequest, StaticMapping, StaticMappingId, StaticMappingRequest,
    StaticMappingSpec,
};
use async_trait::async_trait;
use pfsense_core::session::settle;
use pfsense_core::types::{ApiEndpoint, ApiResponse, ResponseData};
use pfsense_core::{ApiClient, ConnectionLock, Error, Resource, ResourceState, Result, Session};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resource type name as registered with the framework.
pub const RESOURCE_TYPE: &str = "pfsense_dhcp_static_mapping";

/// Static mapping resource bound to one appliance connection.
#[derive(Clone)]
pub struct StaticMappingResource {
    client: ApiClient,
    lock: ConnectionLock,
    settle_delay: Duration,
}

impl StaticMappingResource {
    /// Resource over the REST API of `session`, sharing its lock.
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            client: session.client().clone(),
            lock: session.lock().clone(),
            settle_delay: session.settle_delay(),
        }
    }

    // Caller holds the connection guard.
    async fn fetch(&self, id: &StaticMappingId) -> Result<Option<StaticMapping>> {
        let response: ApiResponse<ResponseData<StaticMapping>> = self
            .client
            .get(ApiEndpoint::DhcpStaticMapping, &id.query())
            .await?;
        let mut found = response.data.into_items();
        if found.len() > 1 {
            return Err(Error::Conflict(format!(
                "{} static mappings match {id}",
                found.len()
            )));
        }
        debug!(%id, present = !found.is_empty(), "fetched static mapping");
        Ok(found.pop())
    }

    async fn fetch_existing(&self, id: &StaticMappingId) -> Result<StaticMapping> {
        self.fetch(id).await?.ok_or_else(|| {
            warn!(%id, "static mapping no longer present");
            Error::NotFound(format!("static mapping {id} not found"))
        })
    }
}

#[async_trait]
impl Resource for StaticMappingResource {
    type Record = StaticMappingSpec;

    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    async fn create(
        &self,
        desired: &StaticMappingSpec,
    ) -> Result<ResourceState<StaticMappingSpec>> {
        let wanted = StaticMappingId::new(desired.interface.as_str(), desired.mac.as_str());

        let id = {
            let _guard = self.lock.acquire().await;
            if let Some(existing) = self.fetch(&wanted).await? {
                return Err(Error::Conflict(format!(
                    "static mapping {wanted} already exists with address {}",
                    existing.ipaddr
                )));
            }

            self.client
                .post_empty(
                    ApiEndpoint::DhcpStaticMapping,
                    &StaticMappingRequest::create(desired),
                )
                .await?;
            settle(self.settle_delay).await;

            let created = self.fetch_existing(&wanted).await?;
            StaticMappingId::new(desired.interface.as_str(), created.mac)
        };

        info!(%id, "created static mapping");
        self.read(&id.to_string()).await
    }

    async fn read(&self, id: &str) -> Result<ResourceState<StaticMappingSpec>> {
        let id = StaticMappingId::decode(id)?;
        let _guard = self.lock.acquire().await;

        let mapping = self.fetch_existing(&id).await?;
        let record = StaticMappingSpec::from_mapping(&mapping, id.interface());
        let id = StaticMappingId::new(id.interface(), mapping.mac);
        Ok(ResourceState::new(id.to_string(), record))
    }

    async fn update(
        &self,
        id: &str,
        desired: &StaticMappingSpec,
    ) -> Result<ResourceState<StaticMappingSpec>> {
        let id = StaticMappingId::decode(id)?;

        {
            let _guard = self.lock.acquire().await;
            let current = self.fetch_existing(&id).await?;
            let request = StaticMappingRequest::update(current.id, id.interface(), desired);
            self.client
                .put(ApiEndpoint::DhcpStaticMapping, &request)
                .await?;
            settle(self.settle_delay).await;
        }

        info!(%id, "updated static mapping");
        let id = StaticMappingId::new(id.interface(), desired.mac.as_str());
        self.read(&id.to_string()).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = StaticMappingId::decode(id)?;
        let _guard = self.lock.acquire().await;

        let current = self.fetch_existing(&id).await?;
        let request = DeleteStaticMappingRequest {
            id: current.id,
            interface: id.interface().to_string(),
        };
        self.client
            .delete(ApiEndpoint::DhcpStaticMapping, &request)
            .await?;
        info!(%id, "deleted static mapping");
        Ok(())
    }
}
