//! Trusted-labeler preference types.

use crate::Did;
use serde::{Deserialize, Serialize};

/// A single labeler entry from accept-labelers negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelerPreference {
    /// DID of the label-issuing service.
    pub did: Did,
    /// When set, content labeled by this issuer is hidden outright rather
    /// than annotated.
    pub redact: bool,
}

impl LabelerPreference {
    /// A labeler trusted for annotation only (`redact = false`).
    pub fn labels_only(did: Did) -> Self {
        Self { did, redact: false }
    }
}

/// An ordered sequence of trusted labelers.
///
/// Order is the caller-declared priority and determines label-application
/// precedence downstream, so it is preserved exactly as negotiated.
/// Duplicates are likewise preserved; deduplication is not part of the wire
/// contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustedLabelers(Vec<LabelerPreference>);

impl TrustedLabelers {
    pub fn new(entries: Vec<LabelerPreference>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabelerPreference> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LabelerPreference] {
        &self.0
    }

    /// Iterates over the labeler DIDs in declared order.
    pub fn dids(&self) -> impl Iterator<Item = &Did> {
        self.0.iter().map(|entry| &entry.did)
    }
}

impl From<Vec<LabelerPreference>> for TrustedLabelers {
    fn from(entries: Vec<LabelerPreference>) -> Self {
        Self(entries)
    }
}

impl<'a> IntoIterator for &'a TrustedLabelers {
    type Item = &'a LabelerPreference;
    type IntoIter = std::slice::Iter<'a, LabelerPreference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for TrustedLabelers {
    type Item = LabelerPreference;
    type IntoIter = std::vec::IntoIter<LabelerPreference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order_and_duplicates() {
        let a = Did::new("did:example:a").unwrap();
        let b = Did::new("did:example:b").unwrap();
        let set = TrustedLabelers::new(vec![
            LabelerPreference::labels_only(a.clone()),
            LabelerPreference { did: b, redact: true },
            LabelerPreference::labels_only(a.clone()),
        ]);
        assert_eq!(set.len(), 3);
        let dids: Vec<&str> = set.dids().map(Did::as_str).collect();
        assert_eq!(dids, ["did:example:a", "did:example:b", "did:example:a"]);
        assert!(!set.as_slice()[0].redact);
        assert!(set.as_slice()[1].redact);
    }

    #[test]
    fn serde_is_transparent() {
        let set = TrustedLabelers::new(vec![LabelerPreference {
            did: Did::new("did:example:a").unwrap(),
            redact: true,
        }]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"did":"did:example:a","redact":true}]"#);
        let back: TrustedLabelers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
