//! Full-list access to port-forward rules.
//!
//! The appliance offers no single-rule GET and returns no identifier from the create
//! call. Every read, every existence check and every post-create verification
//! downloads the entire rule list and scans it.

use crate::fingerprint::Fingerprint;
use crate::models::{CreatePortForwardRequest, DeletePortForwardRequest, NatPortForward};
use async_trait::async_trait;
use pfsense_core::types::{ApiEndpoint, ApiResponse, ResponseData};
use pfsense_core::{ApiClient, Error, Result};
use tracing::debug;

/// Remote operations on the port-forward collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortForwardStore: Send + Sync {
    /// Fetch every rule in list order. An empty list is a valid answer.
    async fn list(&self) -> Result<Vec<NatPortForward>>;

    /// Insert a rule and return the rule as echoed by the appliance.
    async fn create(&self, request: &CreatePortForwardRequest) -> Result<NatPortForward>;

    /// Delete the rule at the position named in the request.
    async fn delete(&self, request: &DeletePortForwardRequest) -> Result<()>;
}

/// [`PortForwardStore`] backed by the REST API.
#[derive(Clone)]
pub struct PortForwardRepository {
    client: ApiClient,
}

impl PortForwardRepository {
    /// Bind the repository to an authenticated client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PortForwardStore for PortForwardRepository {
    async fn list(&self) -> Result<Vec<NatPortForward>> {
        let response: ApiResponse<ResponseData<NatPortForward>> =
            self.client.get(ApiEndpoint::NatPortForward, &[]).await?;
        let rules = response.data.into_items();
        if rules.is_empty() {
            debug!("port forward list is empty");
        } else {
            debug!(count = rules.len(), "fetched port forward list");
        }
        Ok(rules)
    }

    async fn create(&self, request: &CreatePortForwardRequest) -> Result<NatPortForward> {
        let response: ApiResponse<NatPortForward> =
            self.client.post(ApiEndpoint::NatPortForward, request).await?;
        Ok(response.data)
    }

    async fn delete(&self, request: &DeletePortForwardRequest) -> Result<()> {
        self.client
            .delete(ApiEndpoint::NatPortForward, request)
            .await
    }
}

/// Rule at `position`.
///
/// # Errors
///
/// Returns [`Error::IndexOutOfRange`] when the list has shrunk below the position.
pub fn find_by_ordinal(rules: &[NatPortForward], position: usize) -> Result<&NatPortForward> {
    rules.get(position).ok_or(Error::IndexOutOfRange {
        index: position,
        len: rules.len(),
    })
}

/// First rule whose fingerprint equals `target`, with its position.
///
/// Rules identical in every fingerprinted field are indistinguishable; the first one
/// wins.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when no rule matches.
pub fn locate<'a>(
    rules: &'a [NatPortForward],
    target: &Fingerprint,
) -> Result<(usize, &'a NatPortForward)> {
    rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.fingerprint() == *target)
        .ok_or_else(|| {
            Error::NotFound(format!(
                "no port forward with fingerprint {target} among {} rules",
                rules.len()
            ))
        })
}
