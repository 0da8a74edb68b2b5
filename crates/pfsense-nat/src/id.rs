//! Resource identifiers for port-forward rules: `"<interface>/<ordinal>"`.
//!
//! An identifier is only as good as the list it was minted from. Once a rule is
//! inserted ahead of it or removed before it, the ordinal points at a different rule
//! or past the end of the list.

use pfsense_core::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/]+)/([0-9]+)$").expect("identifier pattern is valid")
});

/// Decoded port-forward identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortForwardId {
    interface: String,
    ordinal: usize,
}

impl PortForwardId {
    /// Identifier for the rule at `ordinal` on `interface`.
    #[must_use]
    pub fn new(interface: impl Into<String>, ordinal: usize) -> Self {
        Self {
            interface: interface.into(),
            ordinal,
        }
    }

    /// Interface part.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Position in the listed rule sequence.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Parse `"<interface>/<ordinal>"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIdentifier`] unless the input is a non-empty interface
    /// name without slashes, one slash, and a decimal ordinal.
    pub fn decode(input: &str) -> Result<Self> {
        let malformed = || {
            Error::MalformedIdentifier(format!(
                "`{input}` is not of the form <interface>/<ordinal>"
            ))
        };

        let captures = ID_PATTERN.captures(input).ok_or_else(malformed)?;
        let ordinal = captures[2].parse::<usize>().map_err(|_| malformed())?;
        Ok(Self::new(&captures[1], ordinal))
    }

    /// Render as `"<interface>/<ordinal>"`.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PortForwardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.interface, self.ordinal)
    }
}

impl FromStr for PortForwardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

/// Encode an interface and ordinal into an identifier string.
#[must_use]
pub fn encode(interface: &str, ordinal: usize) -> String {
    PortForwardId::new(interface, ordinal).encode()
}

/// Decode an identifier string into its interface and ordinal.
///
/// # Errors
///
/// Returns [`Error::MalformedIdentifier`] for anything but `<interface>/<digits>`.
pub fn decode(input: &str) -> Result<(String, usize)> {
    let id = PortForwardId::decode(input)?;
    Ok((id.interface, id.ordinal))
}
