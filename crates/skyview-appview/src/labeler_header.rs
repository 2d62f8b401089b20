//! Parsing for the `atproto-accept-labelers` request header.
//!
//! The header declares, in priority order, which moderation-label issuers
//! the caller trusts: a comma-separated list of `<did>[;redact]` tokens.
//! Rejection is all-or-nothing — a header with one bad token is treated as
//! if it carried none, so a partially-malformed trust declaration is never
//! silently honored. Parsing here is pure; the fallback-and-log behavior
//! lives on [`crate::AppContext`].

use skyview_types::{Did, DidError, LabelerPreference, TrustedLabelers};
use thiserror::Error;

/// Name of the trust-declaration header.
pub const ACCEPT_LABELERS_HEADER: &str = "atproto-accept-labelers";

/// Maximum number of labeler entries accepted in one header.
///
/// Exceeding it rejects the whole header rather than truncating, since
/// truncation would silently reorder label-application priority.
pub const MAX_ACCEPT_LABELERS: usize = 20;

/// Errors produced by [`parse_labeler_header`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelerHeaderError {
    /// A token's DID segment failed syntactic validation.
    #[error("invalid labeler DID {raw:?}: {source}")]
    InvalidDid {
        raw: String,
        #[source]
        source: DidError,
    },

    /// A token carried a parameter other than `redact`.
    #[error("unknown labeler parameter {0:?}")]
    UnknownParameter(String),

    /// The header declared more than [`MAX_ACCEPT_LABELERS`] entries.
    #[error("{0} labelers exceeds the maximum of {MAX_ACCEPT_LABELERS}")]
    TooManyLabelers(usize),
}

/// Parses an `atproto-accept-labelers` header value.
///
/// Returns `Ok(None)` when the header is absent or empty — the caller
/// substitutes the configured default set. Declared order and duplicates
/// are preserved exactly.
///
/// # Errors
///
/// Any structurally invalid token, unknown parameter, or over-limit entry
/// count rejects the entire header.
pub fn parse_labeler_header(
    value: Option<&str>,
) -> Result<Option<TrustedLabelers>, LabelerHeaderError> {
    let value = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Ok(None),
    };

    let tokens: Vec<&str> = value.split(',').collect();
    if tokens.len() > MAX_ACCEPT_LABELERS {
        return Err(LabelerHeaderError::TooManyLabelers(tokens.len()));
    }

    let mut entries = Vec::with_capacity(tokens.len());
    for token in tokens {
        entries.push(parse_labeler_token(token)?);
    }
    Ok(Some(TrustedLabelers::new(entries)))
}

/// Parses one `<did>[;redact]` token.
fn parse_labeler_token(token: &str) -> Result<LabelerPreference, LabelerHeaderError> {
    let mut parts = token.split(';');
    // `split` yields at least one element.
    let raw_did = parts.next().unwrap_or_default().trim();
    let did = Did::new(raw_did).map_err(|source| LabelerHeaderError::InvalidDid {
        raw: raw_did.to_string(),
        source,
    })?;

    let mut redact = false;
    for param in parts {
        match param.trim() {
            "redact" => redact = true,
            other => return Err(LabelerHeaderError::UnknownParameter(other.to_string())),
        }
    }
    Ok(LabelerPreference { did, redact })
}

/// Builds the default trusted-labeler set from configured issuer DIDs.
///
/// Entries keep configured order and are annotation-only (`redact = false`).
pub fn default_labelers(dids: &[Did]) -> TrustedLabelers {
    TrustedLabelers::new(
        dids.iter()
            .cloned()
            .map(LabelerPreference::labels_only)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn did(s: &str) -> Did {
        Did::new(s).unwrap()
    }

    #[test]
    fn absent_and_empty_are_none() {
        assert_eq!(parse_labeler_header(None).unwrap(), None);
        assert_eq!(parse_labeler_header(Some("")).unwrap(), None);
        assert_eq!(parse_labeler_header(Some("   ")).unwrap(), None);
    }

    #[test]
    fn parses_ordered_entries_with_redact() {
        let parsed = parse_labeler_header(Some("did:example:abc;redact,did:example:def"))
            .unwrap()
            .unwrap();
        assert_eq!(
            parsed.as_slice(),
            [
                LabelerPreference {
                    did: did("did:example:abc"),
                    redact: true,
                },
                LabelerPreference {
                    did: did("did:example:def"),
                    redact: false,
                },
            ]
        );
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        let parsed = parse_labeler_header(Some(" did:plc:a , did:plc:b ; redact "))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.as_slice()[0].did, did("did:plc:a"));
        assert!(parsed.as_slice()[1].redact);
    }

    #[test]
    fn preserves_duplicates() {
        let parsed = parse_labeler_header(Some("did:plc:a,did:plc:a;redact"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(!parsed.as_slice()[0].redact);
        assert!(parsed.as_slice()[1].redact);
    }

    #[test]
    fn one_bad_token_rejects_the_whole_header() {
        let result = parse_labeler_header(Some("did:plc:a,not-a-did,did:plc:b"));
        assert!(matches!(
            result,
            Err(LabelerHeaderError::InvalidDid { ref raw, .. }) if raw == "not-a-did"
        ));
    }

    #[test]
    fn empty_token_rejects() {
        assert!(parse_labeler_header(Some("did:plc:a,,did:plc:b")).is_err());
        assert!(parse_labeler_header(Some("did:plc:a,")).is_err());
    }

    #[test]
    fn unknown_parameter_rejects() {
        assert_eq!(
            parse_labeler_header(Some("did:plc:a;hide")),
            Err(LabelerHeaderError::UnknownParameter("hide".to_string()))
        );
    }

    #[test]
    fn over_limit_rejects_without_truncating() {
        let value = (0..MAX_ACCEPT_LABELERS + 1)
            .map(|i| format!("did:plc:l{i}"))
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(
            parse_labeler_header(Some(&value)),
            Err(LabelerHeaderError::TooManyLabelers(MAX_ACCEPT_LABELERS + 1))
        );

        // Exactly at the limit is fine.
        let value = (0..MAX_ACCEPT_LABELERS)
            .map(|i| format!("did:plc:l{i}"))
            .collect::<Vec<_>>()
            .join(",");
        let parsed = parse_labeler_header(Some(&value)).unwrap().unwrap();
        assert_eq!(parsed.len(), MAX_ACCEPT_LABELERS);
    }

    #[test]
    fn default_set_keeps_configured_order() {
        let defaults = default_labelers(&[did("did:plc:b"), did("did:plc:a")]);
        let dids: Vec<&str> = defaults.dids().map(Did::as_str).collect();
        assert_eq!(dids, ["did:plc:b", "did:plc:a"]);
        assert!(defaults.iter().all(|entry| !entry.redact));
    }
}
