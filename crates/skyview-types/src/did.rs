//! Syntactic validation for decentralized identifiers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on accepted DID length.
///
/// Generous by design: `did:web` identifiers can embed long hostnames and
/// paths, but anything past this is either garbage or an attack on parsers
/// downstream.
pub const MAX_DID_LEN: usize = 2048;

/// Errors produced by [`Did`] validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DidError {
    /// The value does not start with the `did:` scheme prefix.
    #[error("DID must start with \"did:\": {0:?}")]
    MissingPrefix(String),

    /// The method segment is empty or contains characters outside `[a-z0-9]`.
    #[error("DID method must be one or more lowercase letters or digits: {0:?}")]
    InvalidMethod(String),

    /// The method-specific identifier is empty, ends with `:`, or contains
    /// a character outside the allowed set.
    #[error("DID method-specific identifier is invalid: {0:?}")]
    InvalidIdentifier(String),

    /// The value exceeds [`MAX_DID_LEN`] characters.
    #[error("DID exceeds {MAX_DID_LEN} characters")]
    TooLong,
}

/// A syntactically validated decentralized identifier.
///
/// Validation is purely structural (`did:<method>:<identifier>`); whether the
/// DID actually resolves is the identity resolver's concern, not this type's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    /// Validates `s` and wraps it as a [`Did`].
    pub fn new(s: &str) -> Result<Self, DidError> {
        if s.len() > MAX_DID_LEN {
            return Err(DidError::TooLong);
        }
        let rest = s
            .strip_prefix("did:")
            .ok_or_else(|| DidError::MissingPrefix(s.to_string()))?;
        let (method, identifier) = rest
            .split_once(':')
            .ok_or_else(|| DidError::InvalidIdentifier(s.to_string()))?;
        if method.is_empty()
            || !method
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(DidError::InvalidMethod(s.to_string()));
        }
        if identifier.is_empty()
            || identifier.ends_with(':')
            || !identifier
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'%' | b'-' | b':'))
        {
            return Err(DidError::InvalidIdentifier(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the DID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the method segment (e.g. `plc` for `did:plc:abc`).
    pub fn method(&self) -> &str {
        // Validated in `new`: prefix and a second `:` are both present.
        let rest = &self.0["did:".len()..];
        match rest.split_once(':') {
            Some((method, _)) => method,
            None => rest,
        }
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Did::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_methods() {
        for s in [
            "did:plc:z72i7hdynmk6r22z27h6tvur",
            "did:web:api.example.com",
            "did:example:abc",
            "did:key:zQ3shunBK",
            "did:web:example.com%3A8080",
        ] {
            let did = Did::new(s).unwrap();
            assert_eq!(did.as_str(), s);
        }
    }

    #[test]
    fn method_segment() {
        assert_eq!(Did::new("did:plc:abc").unwrap().method(), "plc");
        assert_eq!(Did::new("did:web:example.com").unwrap().method(), "web");
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(matches!(
            Did::new("not-a-did"),
            Err(DidError::MissingPrefix(_))
        ));
        assert!(matches!(
            Did::new("DID:plc:abc"),
            Err(DidError::MissingPrefix(_))
        ));
    }

    #[test]
    fn rejects_bad_method() {
        assert!(matches!(
            Did::new("did:PLC:abc"),
            Err(DidError::InvalidMethod(_))
        ));
        assert!(matches!(
            Did::new("did::abc"),
            Err(DidError::InvalidMethod(_))
        ));
    }

    #[test]
    fn rejects_bad_identifier() {
        // No second colon at all.
        assert!(matches!(
            Did::new("did:plc"),
            Err(DidError::InvalidIdentifier(_))
        ));
        // Empty identifier.
        assert!(matches!(
            Did::new("did:plc:"),
            Err(DidError::InvalidIdentifier(_))
        ));
        // Trailing colon.
        assert!(matches!(
            Did::new("did:plc:abc:"),
            Err(DidError::InvalidIdentifier(_))
        ));
        // Disallowed character.
        assert!(matches!(
            Did::new("did:plc:abc/def"),
            Err(DidError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn rejects_oversized() {
        let huge = format!("did:plc:{}", "a".repeat(MAX_DID_LEN));
        assert_eq!(Did::new(&huge), Err(DidError::TooLong));
    }

    #[test]
    fn deserialize_validates() {
        let ok: Did = serde_json::from_str("\"did:plc:abc\"").unwrap();
        assert_eq!(ok.as_str(), "did:plc:abc");
        assert!(serde_json::from_str::<Did>("\"nope\"").is_err());
    }
}
