//! Firewall alias models.
//!
//! The appliance stores an alias's entries as two parallel lists: addresses and
//! per-address details. Depending on the API version they come back either as JSON
//! arrays or flattened into strings, addresses joined by a space and details joined
//! by `||`.

use pfsense_core::types::lenient_string;
use pfsense_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("alias name pattern is valid"));

const ADDRESS_SEPARATOR: &str = " ";
const DETAIL_SEPARATOR: &str = "||";

/// Kind of entries an alias holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasType {
    /// Host addresses or FQDNs.
    #[default]
    Host,
    /// Networks in CIDR notation.
    Network,
    /// Ports or port ranges.
    Port,
}

impl AliasType {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Network => "network",
            Self::Port => "port",
        }
    }
}

impl fmt::Display for AliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AliasType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "host" => Ok(Self::Host),
            "network" => Ok(Self::Network),
            "port" => Ok(Self::Port),
            other => Err(Error::ParseError(format!(
                "unsupported alias type `{other}`"
            ))),
        }
    }
}

/// One alias entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasValue {
    /// Address, network or port.
    pub value: String,
    /// Free-form note for the entry.
    #[serde(default)]
    pub details: String,
}

impl AliasValue {
    /// Entry without details.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            details: String::new(),
        }
    }
}

/// Desired state of an alias.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasSpec {
    /// Alias name, also its identifier.
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: AliasType,
    /// Description.
    #[serde(default)]
    pub desc: Option<String>,
    /// Entries, in order.
    pub values: Vec<AliasValue>,
}

impl AliasSpec {
    /// Project an observed alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] when the appliance reports an unknown alias type.
    pub fn from_alias(alias: &Alias) -> Result<Self> {
        Ok(Self {
            name: alias.name.clone(),
            kind: alias.kind.parse()?,
            desc: (!alias.description.is_empty()).then(|| alias.description.clone()),
            values: alias.values(),
        })
    }
}

/// Returns true if `name` is a legal alias name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Check that an identifier is a legal alias name.
///
/// # Errors
///
/// Returns [`Error::MalformedIdentifier`] otherwise.
pub fn decode_id(id: &str) -> Result<&str> {
    if is_valid_name(id) {
        Ok(id)
    } else {
        Err(Error::MalformedIdentifier(format!(
            "`{id}` must match {}",
            NAME_PATTERN.as_str()
        )))
    }
}

/// Alias as returned by the appliance.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Alias {
    /// Alias name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Entry kind as reported.
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    /// Description.
    #[serde(default, rename = "descr", deserialize_with = "lenient_string")]
    pub description: String,
    /// Entry values.
    #[serde(default, deserialize_with = "space_separated")]
    pub address: Vec<String>,
    /// Entry details, parallel to `address`.
    #[serde(default, deserialize_with = "pipe_separated")]
    pub detail: Vec<String>,
}

impl Alias {
    /// Pair addresses with their details. Missing details are empty.
    #[must_use]
    pub fn values(&self) -> Vec<AliasValue> {
        self.address
            .iter()
            .enumerate()
            .map(|(i, value)| AliasValue {
                value: value.clone(),
                details: self.detail.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

fn space_separated<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    split_list(Value::deserialize(deserializer)?, ADDRESS_SEPARATOR)
}

fn pipe_separated<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    split_list(Value::deserialize(deserializer)?, DETAIL_SEPARATOR)
}

fn split_list<E>(value: Value, separator: &str) -> std::result::Result<Vec<String>, E>
where
    E: serde::de::Error,
{
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(joined) if joined.is_empty() => Ok(Vec::new()),
        Value::String(joined) => Ok(joined.split(separator).map(str::to_string).collect()),
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect()),
        other => Err(E::custom(format!("expected string or array, got {other}"))),
    }
}

/// `address`/`detail` payload: a scalar for one entry, arrays otherwise.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    /// Single entry.
    One(String),
    /// Several entries.
    Many(Vec<String>),
}

impl OneOrMany {
    fn from_vec(mut items: Vec<String>) -> Self {
        if items.len() == 1 {
            Self::One(items.remove(0))
        } else {
            Self::Many(items)
        }
    }
}

/// Request payload for creating or updating an alias.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AliasRequest {
    /// Current name of the alias being replaced; only sent on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Alias name.
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: AliasType,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    /// Entry values.
    pub address: OneOrMany,
    /// Entry details.
    pub detail: OneOrMany,
}

impl AliasRequest {
    /// Create payload for `spec`.
    #[must_use]
    pub fn create(spec: &AliasSpec) -> Self {
        let (address, detail): (Vec<String>, Vec<String>) = spec
            .values
            .iter()
            .map(|v| (v.value.clone(), v.details.clone()))
            .unzip();
        Self {
            id: None,
            name: spec.name.clone(),
            kind: spec.kind,
            descr: spec.desc.clone(),
            address: OneOrMany::from_vec(address),
            detail: OneOrMany::from_vec(detail),
        }
    }

    /// Update payload replacing the alias currently named `current`.
    #[must_use]
    pub fn update(current: &str, spec: &AliasSpec) -> Self {
        Self {
            id: Some(current.to_string()),
            ..Self::create(spec)
        }
    }
}

/// Request payload for deleting an alias.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeleteAliasRequest {
    /// Alias name.
    pub id: String,
}
