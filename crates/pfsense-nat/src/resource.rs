//! Lifecycle of the `pfsense_nat_port_forward` resource.
//!
//! Every operation runs under the session's connection lock. Create and Update drive
//! the same insert-then-locate sequence: POST the rule at the top of the list, wait
//! for the appliance to apply it, re-list everything and find the new rule by its
//! content fingerprint. Its position becomes the ordinal of the identifier.

use crate::id::PortForwardId;
use crate::models::{CreatePortForwardRequest, DeletePortForwardRequest, PortForwardSpec};
use crate::repository::{find_by_ordinal, locate, PortForwardRepository, PortForwardStore};
use async_trait::async_trait;
use pfsense_core::session::{settle, DEFAULT_SETTLE_DELAY};
use pfsense_core::{ConnectionLock, Error, Resource, ResourceState, Result, Session};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resource type name as registered with the framework.
pub const RESOURCE_TYPE: &str = "pfsense_nat_port_forward";

/// Port-forward resource bound to one appliance connection.
pub struct PortForwardResource<S = PortForwardRepository> {
    store: S,
    lock: ConnectionLock,
    settle_delay: Duration,
}

impl PortForwardResource {
    /// Resource over the REST API of `session`, sharing its lock.
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            store: PortForwardRepository::new(session.client().clone()),
            lock: session.lock().clone(),
            settle_delay: session.settle_delay(),
        }
    }
}

impl<S: PortForwardStore> PortForwardResource<S> {
    /// Resource over an arbitrary store.
    #[must_use]
    pub fn with_store(store: S, lock: ConnectionLock) -> Self {
        Self {
            store,
            lock,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the delay between a write and the verifying re-list.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    // Caller holds the connection guard.
    async fn insert_and_locate(&self, desired: &PortForwardSpec) -> Result<PortForwardId> {
        let request = CreatePortForwardRequest::from(desired);
        let created = self.store.create(&request).await?;
        let fingerprint = created.fingerprint();
        debug!(%fingerprint, "port forward created, locating it");

        settle(self.settle_delay).await;

        let rules = self.store.list().await?;
        let (ordinal, _) = locate(&rules, &fingerprint)?;
        Ok(PortForwardId::new(desired.interface.as_str(), ordinal))
    }

    // Caller holds the connection guard.
    async fn ensure_present(&self, id: &PortForwardId) -> Result<()> {
        let rules = self.store.list().await?;
        find_by_ordinal(&rules, id.ordinal())
            .map(|_| ())
            .map_err(|err| lost(id, &err))
    }
}

fn lost(id: &PortForwardId, err: &Error) -> Error {
    warn!(%id, %err, "port forward no longer present");
    Error::NotFound(format!("port forward {id} not found: {err}"))
}

#[async_trait]
impl<S: PortForwardStore> Resource for PortForwardResource<S> {
    type Record = PortForwardSpec;

    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    async fn create(&self, desired: &PortForwardSpec) -> Result<ResourceState<PortForwardSpec>> {
        let id = {
            let _guard = self.lock.acquire().await;
            self.insert_and_locate(desired).await?
        };
        info!(%id, "created port forward");
        self.read(&id.encode()).await
    }

    async fn read(&self, id: &str) -> Result<ResourceState<PortForwardSpec>> {
        let id = PortForwardId::decode(id)?;
        let _guard = self.lock.acquire().await;

        let rules = self.store.list().await?;
        let rule = find_by_ordinal(&rules, id.ordinal()).map_err(|err| lost(&id, &err))?;
        let record = PortForwardSpec::from_rule(rule, id.interface());
        Ok(ResourceState::new(id.encode(), record))
    }

    async fn update(
        &self,
        id: &str,
        desired: &PortForwardSpec,
    ) -> Result<ResourceState<PortForwardSpec>> {
        let old = PortForwardId::decode(id)?;
        let new = {
            let _guard = self.lock.acquire().await;
            self.ensure_present(&old).await?;
            self.store
                .delete(&DeletePortForwardRequest::at(old.ordinal()))
                .await?;
            self.insert_and_locate(desired).await?
        };
        info!(%old, %new, "replaced port forward");
        self.read(&new.encode()).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = PortForwardId::decode(id)?;
        let _guard = self.lock.acquire().await;

        self.ensure_present(&id).await?;
        self.store
            .delete(&DeletePortForwardRequest::at(id.ordinal()))
            .await?;
        info!(%id, "deleted port forward");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<ResourceState<PortForwardSpec>> {
        let parsed = PortForwardId::decode(id)?;
        debug!(id = %parsed, "importing port forward");
        self.read(id).await
    }
}
