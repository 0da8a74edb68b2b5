//! NAT port-forward models: the remote rule, the declarative record and the request
//! payloads.

use crate::fingerprint::Fingerprint;
use pfsense_core::types::{lenient_string, null_as_default};
use serde::{Deserialize, Serialize};

/// Source or destination of a port-forward rule as returned by the appliance.
///
/// At most one of `address` and `network` is meaningful; when neither is set the
/// endpoint matches anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleEndpoint {
    /// Single host address.
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    /// Network (CIDR or interface network alias).
    #[serde(default, deserialize_with = "lenient_string")]
    pub network: String,
    /// Present (usually empty) when the endpoint matches anything.
    #[serde(default, deserialize_with = "lenient_string")]
    pub any: String,
    /// Present when the match is negated.
    #[serde(default, deserialize_with = "lenient_string")]
    pub not: String,
    /// Port or port range.
    #[serde(default, deserialize_with = "lenient_string")]
    pub port: String,
}

impl RuleEndpoint {
    /// Address shown in the declarative record: address, else network, else `any`.
    #[must_use]
    pub fn display_address(&self) -> &str {
        if !self.address.is_empty() {
            &self.address
        } else if !self.network.is_empty() {
            &self.network
        } else {
            "any"
        }
    }

    /// Port shown in the declarative record; `any` when unset.
    #[must_use]
    pub fn display_port(&self) -> &str {
        if self.port.is_empty() {
            "any"
        } else {
            &self.port
        }
    }
}

/// A NAT port-forward rule as listed by the appliance.
///
/// The appliance exposes no stable key for a rule; its position in the listed
/// sequence is its only address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NatPortForward {
    /// Interface the rule is bound to.
    #[serde(default, deserialize_with = "lenient_string")]
    pub interface: String,
    /// `tcp`, `udp` or `tcp/udp`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub protocol: String,
    /// Source match.
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: RuleEndpoint,
    /// Destination match.
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination: RuleEndpoint,
    /// Internal address traffic is redirected to.
    #[serde(default, deserialize_with = "lenient_string")]
    pub target: String,
    /// Internal port traffic is redirected to.
    #[serde(
        default,
        rename = "local-port",
        deserialize_with = "lenient_string"
    )]
    pub local_port: String,
    /// Free-form description.
    #[serde(
        default,
        rename = "descr",
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,
}

impl NatPortForward {
    /// Content fingerprint of this rule.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_rule(self)
    }
}

/// Desired state of a port-forward rule as held by the declarative framework.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortForwardSpec {
    /// Interface name.
    pub interface: String,
    /// `tcp`, `udp` or `tcp/udp`.
    pub protocol: String,
    /// Source address, network or `any`.
    pub src: String,
    /// Destination address, network or `any`.
    pub dst: String,
    /// Source port or `any`.
    pub srcport: String,
    /// Destination port or `any`.
    pub dstport: String,
    /// Redirect target address.
    #[serde(default)]
    pub target: String,
    /// Redirect target port.
    #[serde(default)]
    pub local_port: String,
}

impl PortForwardSpec {
    /// Project a listed rule into the declarative view.
    ///
    /// Address and network collapse into one string; `fallback_interface` is used only
    /// when the rule carries no interface.
    ///
    /// The interface comes from the rule itself, not from the identifier, so a rule moved
    /// to another interface shows up as drift instead of being masked by the stored id.
    #[must_use]
    pub fn from_rule(rule: &NatPortForward, fallback_interface: &str) -> Self {
        let interface = if rule.interface.is_empty() {
            fallback_interface.to_string()
        } else {
            rule.interface.clone()
        };

        Self {
            interface,
            protocol: rule.protocol.clone(),
            src: rule.source.display_address().to_string(),
            dst: rule.destination.display_address().to_string(),
            srcport: rule.source.display_port().to_string(),
            dstport: rule.destination.display_port().to_string(),
            target: rule.target.clone(),
            local_port: rule.local_port.clone(),
        }
    }
}

/// Request payload for creating a port-forward rule.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreatePortForwardRequest {
    /// Interface name.
    pub interface: String,
    /// Protocol.
    pub protocol: String,
    /// Source.
    pub src: String,
    /// Destination.
    pub dst: String,
    /// Source port.
    pub srcport: String,
    /// Destination port.
    pub dstport: String,
    /// Redirect target address.
    pub target: String,
    /// Redirect target port.
    #[serde(rename = "local-port")]
    pub local_port: String,
    /// Insert at the top of the rule list.
    pub top: bool,
    /// Apply the change immediately.
    pub apply: bool,
}

impl From<&PortForwardSpec> for CreatePortForwardRequest {
    fn from(spec: &PortForwardSpec) -> Self {
        Self {
            interface: spec.interface.clone(),
            protocol: spec.protocol.clone(),
            src: spec.src.clone(),
            dst: spec.dst.clone(),
            srcport: spec.srcport.clone(),
            dstport: spec.dstport.clone(),
            target: spec.target.clone(),
            local_port: spec.local_port.clone(),
            top: true,
            apply: true,
        }
    }
}

/// Request payload for deleting the rule at a list position.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DeletePortForwardRequest {
    /// Position of the rule in the listed sequence.
    pub id: usize,
    /// Apply the change immediately.
    pub apply: bool,
}

impl DeletePortForwardRequest {
    /// Delete the rule at `ordinal` and apply immediately.
    #[must_use]
    pub const fn at(ordinal: usize) -> Self {
        Self {
            id: ordinal,
            apply: true,
        }
    }
}
