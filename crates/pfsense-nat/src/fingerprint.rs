//! Content fingerprints for port-forward rules.
//!
//! The create call returns the new rule but no identifier for it, and the list endpoint
//! exposes no stable key either. A digest over the rule's significant fields stands in
//! as its identity while the freshly created rule is searched for in the list.

use crate::models::{NatPortForward, RuleEndpoint};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest over the significant fields of a rule or rule endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest over `port`, `any`, `network`, `address` and `not`.
    #[must_use]
    pub fn of_endpoint(endpoint: &RuleEndpoint) -> Self {
        Self(digest([
            endpoint.port.as_bytes(),
            endpoint.any.as_bytes(),
            endpoint.network.as_bytes(),
            endpoint.address.as_bytes(),
            endpoint.not.as_bytes(),
        ]))
    }

    /// Digest over target, local port, protocol, interface and both endpoint digests.
    #[must_use]
    pub fn of_rule(rule: &NatPortForward) -> Self {
        let source = Self::of_endpoint(&rule.source);
        let destination = Self::of_endpoint(&rule.destination);
        Self(digest([
            rule.target.as_bytes(),
            rule.local_port.as_bytes(),
            rule.protocol.as_bytes(),
            rule.interface.as_bytes(),
            source.as_bytes().as_slice(),
            destination.as_bytes().as_slice(),
        ]))
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

// Each field is length-prefixed so that content cannot shift across field boundaries.
fn digest<const N: usize>(fields: [&[u8]; N]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NatPortForward {
        NatPortForward {
            interface: "wan".into(),
            protocol: "tcp".into(),
            source: RuleEndpoint {
                any: String::new(),
                port: "80".into(),
                ..RuleEndpoint::default()
            },
            destination: RuleEndpoint {
                network: "wanip".into(),
                port: "8080".into(),
                ..RuleEndpoint::default()
            },
            target: "10.0.0.5".into(),
            local_port: "8080".into(),
            description: String::new(),
        }
    }

    #[test]
    fn identical_rules_share_a_fingerprint() {
        assert_eq!(sample().fingerprint(), sample().fingerprint());
    }

    #[test]
    fn description_is_not_significant() {
        let mut described = sample();
        described.description = "web".into();
        assert_eq!(described.fingerprint(), sample().fingerprint());
    }

    #[test]
    fn every_significant_field_changes_the_fingerprint() {
        let base = sample().fingerprint();
        let mutations: [fn(&mut NatPortForward); 14] = [
            |r| r.target = "10.0.0.6".into(),
            |r| r.local_port = "8081".into(),
            |r| r.protocol = "udp".into(),
            |r| r.interface = "lan".into(),
            |r| r.source.address = "1.2.3.4".into(),
            |r| r.source.network = "lan".into(),
            |r| r.source.any = "1".into(),
            |r| r.source.not = "1".into(),
            |r| r.source.port = "81".into(),
            |r| r.destination.address = "1.2.3.4".into(),
            |r| r.destination.network = "lanip".into(),
            |r| r.destination.any = "1".into(),
            |r| r.destination.not = "1".into(),
            |r| r.destination.port = "8081".into(),
        ];

        for (i, mutate) in mutations.iter().enumerate() {
            let mut rule = sample();
            mutate(&mut rule);
            assert_ne!(rule.fingerprint(), base, "mutation {i} left fingerprint unchanged");
        }
    }

    #[test]
    fn source_and_destination_are_not_interchangeable() {
        let mut swapped = sample();
        std::mem::swap(&mut swapped.source, &mut swapped.destination);
        assert_ne!(swapped.fingerprint(), sample().fingerprint());
    }

    #[test]
    fn adjacent_fields_do_not_bleed() {
        let mut a = sample();
        a.target = "10.0.0.58".into();
        a.local_port = "080".into();
        assert_ne!(a.fingerprint(), sample().fingerprint());
    }

    #[test]
    fn display_is_lowercase_hex() {
        let rendered = sample().fingerprint().to_string();
        assert_eq!(rendered.len(), 64);
        assert!(rendered
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
