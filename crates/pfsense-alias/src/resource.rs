//! Lifecycle of the `pfsense_alias` resource. The alias name is its identifier.

use crate::models::{decode_id, Alias, AliasRequest, AliasSpec, DeleteAliasRequest};
use async_trait::async_trait;
use pfsense_core::session::settle;
use pfsense_core::types::{ApiEndpoint, ApiResponse, ResponseData};
use pfsense_core::{ApiClient, ConnectionLock, Error, Resource, ResourceState, Result, Session};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resource type name as registered with the framework.
pub const RESOURCE_TYPE: &str = "pfsense_alias";

/// Alias resource bound to one appliance connection.
#[derive(Clone)]
pub struct AliasResource {
    client: ApiClient,
    lock: ConnectionLock,
    settle_delay: Duration,
}

impl AliasResource {
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
    async fn fetch(&self, name: &str) -> Result<Option<Alias>> {
        let response: ApiResponse<ResponseData<Alias>> = self
            .client
            .get(ApiEndpoint::Alias, &[("name", name.to_string())])
            .await?;
        let found = response
            .data
            .into_items()
            .into_iter()
            .find(|alias| alias.name == name);
        debug!(name, present = found.is_some(), "fetched alias");
        Ok(found)
    }

    async fn fetch_existing(&self, name: &str) -> Result<Alias> {
        self.fetch(name).await?.ok_or_else(|| {
            warn!(name, "alias no longer present");
            Error::NotFound(format!("alias `{name}` not found"))
        })
    }
}

#[async_trait]
impl Resource for AliasResource {
    type Record = AliasSpec;

    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    async fn create(&self, desired: &AliasSpec) -> Result<ResourceState<AliasSpec>> {
        {
            let _guard = self.lock.acquire().await;
            if self.fetch(&desired.name).await?.is_some() {
                return Err(Error::Conflict(format!(
                    "alias `{}` already exists",
                    desired.name
                )));
            }

            self.client
                .post_empty(ApiEndpoint::Alias, &AliasRequest::create(desired))
                .await?;
            settle(self.settle_delay).await;
            self.fetch_existing(&desired.name).await?;
        }

        info!(name = %desired.name, "created alias");
        self.read(&desired.name).await
    }

    async fn read(&self, id: &str) -> Result<ResourceState<AliasSpec>> {
        let name = decode_id(id)?;
        let _guard = self.lock.acquire().await;

        let alias = self.fetch_existing(name).await?;
        Ok(ResourceState::new(name, AliasSpec::from_alias(&alias)?))
    }

    async fn update(&self, id: &str, desired: &AliasSpec) -> Result<ResourceState<AliasSpec>> {
        let name = decode_id(id)?;

        {
            let _guard = self.lock.acquire().await;
            self.fetch_existing(name).await?;
            self.client
                .put(ApiEndpoint::Alias, &AliasRequest::update(name, desired))
                .await?;
            settle(self.settle_delay).await;
        }

        info!(name, new_name = %desired.name, "updated alias");
        self.read(&desired.name).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let name = decode_id(id)?;
        let _guard = self.lock.acquire().await;

        self.fetch_existing(name).await?;
        let request = DeleteAliasRequest {
            id: name.to_string(),
        };
        self.client.delete(ApiEndpoint::Alias, &request).await?;
        info!(name, "deleted alias");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AliasType, AliasValue};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALIASES: &str = "/firewall/alias";

    fn envelope(data: Value) -> Value {
        json!({"status": "ok", "code": 200, "return": 0, "message": "Success", "data": data})
    }

    fn remote() -> Value {
        json!({
            "name": "web_servers",
            "type": "host",
            "descr": "frontends",
            "address": "10.0.0.1 10.0.0.2",
            "detail": "primary||backup"
        })
    }

    fn desired() -> AliasSpec {
        AliasSpec {
            name: "web_servers".into(),
            kind: AliasType::Host,
            desc: Some("frontends".into()),
            values: vec![
                AliasValue {
                    value: "10.0.0.1".into(),
                    details: "primary".into(),
                },
                AliasValue {
                    value: "10.0.0.2".into(),
                    details: "backup".into(),
                },
            ],
        }
    }

    fn resource(server: &MockServer) -> AliasResource {
        let client = ApiClient::new(server.uri()).unwrap();
        AliasResource::new(&Session::new(client).with_settle_delay(Duration::ZERO))
    }

    async fn mount_fetch(server: &MockServer, data: Value) {
        Mock::given(method("GET"))
            .and(path(ALIASES))
            .and(query_param("name", "web_servers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(data)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn read_splits_flattened_entries() {
        let server = MockServer::start().await;
        mount_fetch(&server, json!({"0": remote()})).await;

        let state = resource(&server).read("web_servers").await.unwrap();
        assert_eq!(state.id, "web_servers");
        assert_eq!(state.record, desired());
    }

    #[tokio::test]
    async fn read_ignores_other_aliases() {
        let server = MockServer::start().await;
        mount_fetch(
            &server,
            json!([{"name": "db_servers", "type": "host", "address": "10.0.1.1"}]),
        )
        .await;

        let err = resource(&server).read("web_servers").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn create_posts_arrays_and_verifies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALIASES))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_fetch(&server, json!([remote()])).await;

        Mock::given(method("POST"))
            .and(path(ALIASES))
            .and(body_json(json!({
                "name": "web_servers",
                "type": "host",
                "descr": "frontends",
                "address": ["10.0.0.1", "10.0.0.2"],
                "detail": ["primary", "backup"]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let state = resource(&server).create(&desired()).await.unwrap();
        assert_eq!(state.id, "web_servers");
    }

    #[tokio::test]
    async fn create_of_existing_alias_conflicts() {
        let server = MockServer::start().await;
        mount_fetch(&server, json!([remote()])).await;

        let err = resource(&server).create(&desired()).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn update_puts_with_current_name() {
        let server = MockServer::start().await;
        mount_fetch(&server, json!([remote()])).await;

        Mock::given(method("PUT"))
            .and(path(ALIASES))
            .and(body_json(json!({
                "id": "web_servers",
                "name": "web_servers",
                "type": "host",
                "descr": "frontends",
                "address": ["10.0.0.1", "10.0.0.2"],
                "detail": ["primary", "backup"]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        resource(&server)
            .update("web_servers", &desired())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_update_surfaces_body() {
        let server = MockServer::start().await;
        mount_fetch(&server, json!([remote()])).await;

        Mock::given(method("PUT"))
            .and(path(ALIASES))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad address"))
            .mount(&server)
            .await;

        let err = resource(&server)
            .update("web_servers", &desired())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::RemoteRejected {
                status: 400,
                body: "bad address".to_string()
            }
        );
    }

    #[tokio::test]
    async fn delete_sends_name() {
        let server = MockServer::start().await;
        mount_fetch(&server, json!([remote()])).await;

        Mock::given(method("DELETE"))
            .and(path(ALIASES))
            .and(body_json(json!({"id": "web_servers"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        resource(&server).delete("web_servers").await.unwrap();
    }

    #[tokio::test]
    async fn illegal_name_is_malformed() {
        let server = MockServer::start().await;
        let err = resource(&server).read("web-servers").await.unwrap_err();
        assert!(matches!(err, Error::MalformedIdentifier(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
