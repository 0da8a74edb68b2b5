//! DHCP static mapping models.

use pfsense_core::types::lenient_string;
use pfsense_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/]+)/([^/]+)$").expect("identifier pattern is valid")
});

/// Static mapping as returned by the appliance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaticMapping {
    /// Position of the mapping within its interface's DHCP configuration.
    #[serde(default)]
    pub id: usize,
    /// Hardware address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub mac: String,
    /// DHCP client identifier.
    #[serde(default, deserialize_with = "lenient_string")]
    pub cid: String,
    /// Reserved IP address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ipaddr: String,
    /// Hostname handed to the client.
    #[serde(default, deserialize_with = "lenient_string")]
    pub hostname: String,
}

/// Desired state of a static mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaticMappingSpec {
    /// Interface whose DHCP server owns the mapping.
    pub interface: String,

    /// Hardware address.
    pub mac: String,

    /// Reserved IP address.
    pub ipaddr: String,

    /// DHCP client identifier.
    #[serde(default)]
    pub client_identifier: Option<String>,

    /// Hostname handed to the client.
    #[serde(default)]
    pub hostname: Option<String>,
}

impl StaticMappingSpec {
    /// Project an observed mapping. Empty optional fields become `None`.
    #[must_use]
    pub fn from_mapping(mapping: &StaticMapping, interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
            mac: mapping.mac.clone(),
            ipaddr: mapping.ipaddr.clone(),
            client_identifier: non_empty(&mapping.cid),
            hostname: non_empty(&mapping.hostname),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Request payload for creating or updating a mapping.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StaticMappingRequest {
    /// Server-side id; only sent on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    /// Interface name.
    pub interface: String,
    /// Hardware address.
    pub mac: String,
    /// Reserved IP address.
    pub ipaddr: String,
    /// DHCP client identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// Hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl StaticMappingRequest {
    /// Create payload for `spec`.
    #[must_use]
    pub fn create(spec: &StaticMappingSpec) -> Self {
        Self {
            id: None,
            interface: spec.interface.clone(),
            mac: spec.mac.clone(),
            ipaddr: spec.ipaddr.clone(),
            cid: spec.client_identifier.clone(),
            hostname: spec.hostname.clone(),
        }
    }

    /// Update payload replacing mapping `id` on `interface` with `spec`.
    #[must_use]
    pub fn update(id: usize, interface: &str, spec: &StaticMappingSpec) -> Self {
        Self {
            id: Some(id),
            interface: interface.to_string(),
            ..Self::create(spec)
        }
    }
}

/// Request payload for deleting a mapping.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeleteStaticMappingRequest {
    /// Server-side id.
    pub id: usize,
    /// Interface name.
    pub interface: String,
}

/// Identifier `"<interface>/<mac>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticMappingId {
    interface: String,
    mac: String,
}

impl StaticMappingId {
    /// Identifier for `mac` on `interface`.
    #[must_use]
    pub fn new(interface: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            mac: mac.into(),
        }
    }

    /// Interface part.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// MAC part.
    #[must_use]
    pub fn mac(&self) -> &str {
        &self.mac
    }

    /// Parse `"<interface>/<mac>"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIdentifier`] unless the input has exactly two
    /// non-empty parts separated by a slash.
    pub fn decode(input: &str) -> Result<Self> {
        let captures = ID_PATTERN.captures(input).ok_or_else(|| {
            Error::MalformedIdentifier(format!("`{input}` is not of the form <interface>/<mac>"))
        })?;
        Ok(Self::new(&captures[1], &captures[2]))
    }

    /// Query pairs selecting this mapping.
    #[must_use]
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("interface", self.interface.clone()),
            ("mac", self.mac.clone()),
        ]
    }
}

impl fmt::Display for StaticMappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.interface, self.mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> StaticMappingSpec {
        StaticMappingSpec {
            interface: "lan".into(),
            mac: "00:11:22:aa:bb:cc".into(),
            ipaddr: "192.168.1.50".into(),
            client_identifier: None,
            hostname: Some("printer".into()),
        }
    }

    #[test]
    fn create_payload_omits_unset_fields() {
        let body = serde_json::to_value(StaticMappingRequest::create(&spec())).unwrap();
        assert_eq!(
            body,
            json!({
                "interface": "lan",
                "mac": "00:11:22:aa:bb:cc",
                "ipaddr": "192.168.1.50",
                "hostname": "printer"
            })
        );
    }

    #[test]
    fn update_payload_carries_server_id_and_stored_interface() {
        let mut desired = spec();
        desired.interface = "opt1".into();
        let body = serde_json::to_value(StaticMappingRequest::update(3, "lan", &desired)).unwrap();
        assert_eq!(body["id"], 3);
        assert_eq!(body["interface"], "lan");
    }

    #[test]
    fn projection_drops_empty_optionals() {
        let mapping: StaticMapping = serde_json::from_value(json!({
            "id": 2,
            "mac": "00:11:22:aa:bb:cc",
            "ipaddr": "192.168.1.50",
            "cid": "",
            "hostname": null
        }))
        .unwrap();

        let spec = StaticMappingSpec::from_mapping(&mapping, "lan");
        assert_eq!(spec.client_identifier, None);
        assert_eq!(spec.hostname, None);
        assert_eq!(spec.interface, "lan");
    }

    #[test]
    fn identifier_round_trip() {
        let id = StaticMappingId::decode("lan/00:11:22:aa:bb:cc").unwrap();
        assert_eq!(id.interface(), "lan");
        assert_eq!(id.mac(), "00:11:22:aa:bb:cc");
        assert_eq!(id.to_string(), "lan/00:11:22:aa:bb:cc");
    }

    #[test]
    fn identifier_rejects_malformed_input() {
        for input in ["lan", "lan/", "/00:11", "lan/a/b", ""] {
            assert!(matches!(
                StaticMappingId::decode(input),
                Err(Error::MalformedIdentifier(_))
            ));
        }
    }
}
