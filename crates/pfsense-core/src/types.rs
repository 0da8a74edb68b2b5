//! Core pfSense API types.
//!
//! This module provides the fixed endpoint table and the response envelope shared by
//! every endpoint of the pfSense REST API.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Fixed endpoints of the pfSense REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiEndpoint {
    /// Token exchange
    AccessToken,
    /// NAT port-forward rules
    NatPortForward,
    /// DHCP static mappings
    DhcpStaticMapping,
    /// Firewall aliases
    Alias,
}

impl ApiEndpoint {
    /// Returns the endpoint path relative to the API base URL.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::AccessToken => "/access_token",
            Self::NatPortForward => "/firewall/nat/port_forward",
            Self::DhcpStaticMapping => "/services/dhcpd/static_mapping",
            Self::Alias => "/firewall/alias",
        }
    }

    /// Returns a short name used in logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::NatPortForward => "nat_port_forward",
            Self::DhcpStaticMapping => "dhcp_static_mapping",
            Self::Alias => "alias",
        }
    }

    /// Returns all endpoints.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AccessToken,
            Self::NatPortForward,
            Self::DhcpStaticMapping,
            Self::Alias,
        ]
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Response envelope returned by every endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    /// Textual status, e.g. `"ok"`
    #[serde(default)]
    pub status: String,
    /// HTTP status code echoed by the API
    #[serde(default)]
    pub code: u16,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// API-specific return code
    #[serde(default, rename = "return")]
    pub return_code: i64,
    /// Payload
    pub data: T,
}

/// List-like `data` payload.
///
/// Depending on the endpoint and on the query, the API answers with an array, with a
/// mapping keyed by the object's index, or with `null`. The shape is picked by looking
/// at the raw JSON value; [`ResponseData::into_items`] normalizes all of them into one
/// ordered sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseData<T> {
    /// JSON array
    List(Vec<T>),
    /// JSON object keyed by index
    Map(Vec<(String, T)>),
    /// `null`
    #[default]
    Empty,
}

impl<T> ResponseData<T> {
    /// Number of entries in the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Map(entries) => entries.len(),
            Self::Empty => 0,
        }
    }

    /// Returns true when the payload carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize into a single ordered sequence.
    ///
    /// Mapping entries are ordered by their numeric key; keys that are not numbers sort
    /// after all numeric keys, lexically.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::List(items) => items,
            Self::Map(mut entries) => {
                entries.sort_by(|(a, _), (b, _)| {
                    match (a.parse::<u64>(), b.parse::<u64>()) {
                        (Ok(a), Ok(b)) => a.cmp(&b),
                        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                        (Err(_), Err(_)) => a.cmp(b),
                    }
                });
                entries.into_iter().map(|(_, item)| item).collect()
            }
            Self::Empty => Vec::new(),
        }
    }
}

impl<'de, T> Deserialize<'de> for ResponseData<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Self::Empty),
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<Vec<T>, _>>()
                .map(Self::List)
                .map_err(de::Error::custom),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| serde_json::from_value(value).map(|item| (key, item)))
                .collect::<std::result::Result<Vec<(String, T)>, _>>()
                .map(Self::Map)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "expected array, object or null for `data`, got {other}"
            ))),
        }
    }
}

/// Deserialize a scalar field that the appliance may render as a string, a number, a
/// boolean or `null`.
///
/// The API serializes its XML configuration, so flags show up as empty strings,
/// booleans or nulls depending on the version. `null` and `false` become an empty
/// string, `true` becomes `"1"`, numbers keep their decimal form.
///
/// # Errors
///
/// Fails only if the input is not valid JSON.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => String::new(),
        Value::String(value) => value,
        Value::Bool(true) => "1".to_string(),
        other => other.to_string(),
    })
}

/// Deserialize `null` as the type's default value.
///
/// # Errors
///
/// Returns the deserializer's error when a non-null value does not fit `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
