//! Service-to-service JWT issuance and verification.
//!
//! When the appview calls another internal service it authenticates with a
//! short-lived bearer JWT signed by the process Ed25519 key: compact JWS
//! form, `EdDSA` algorithm, claims `{iss, aud, iat, exp, jti}`. The `jti`
//! nonce keeps two tokens minted within the same second distinct (Ed25519
//! signatures are deterministic, so identical payloads would otherwise
//! yield identical tokens). The receiving side resolves `iss` to a public
//! key through the identity layer and verifies independently; expiry is
//! enforced by the verifier, not the issuer.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use skyview_types::Did;
use thiserror::Error;

/// Errors from JWT issuance and verification.
#[derive(Debug, Error)]
pub enum ServiceJwtError {
    /// Claims failed to serialize. Surfaced to the caller of the outbound
    /// call that needed the token; never swallowed.
    #[error("failed to encode JWT claims: {0}")]
    Encode(#[from] serde_json::Error),

    /// The token does not have the `header.payload.signature` shape or a
    /// segment is not valid base64url/JSON.
    #[error("malformed service JWT: {0}")]
    Malformed(&'static str),

    /// The signature does not verify under the expected public key.
    #[error("service JWT signature verification failed")]
    BadSignature,

    /// The token's `exp` is in the past.
    #[error("service JWT expired at {0}")]
    Expired(i64),
}

/// Claims carried by a service JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceJwtClaims {
    /// Issuing service DID.
    pub iss: String,
    /// Audience service DID. One token is valid for exactly one audience.
    pub aud: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. Strictly greater than `iat`.
    pub exp: i64,
    /// Random nonce distinguishing same-second issuances.
    pub jti: String,
}

#[derive(Serialize)]
struct JwtHeader {
    typ: &'static str,
    alg: &'static str,
}

const HEADER: JwtHeader = JwtHeader {
    typ: "JWT",
    alg: "EdDSA",
};

/// Mints a fresh service JWT for one `(iss, aud)` pair.
///
/// Signing is local and synchronous; safe to call concurrently, the key
/// needs no external synchronization.
///
/// # Errors
///
/// Returns `ServiceJwtError::Encode` if claims serialization fails.
pub fn create_service_jwt(
    iss: &Did,
    aud: &Did,
    key: &SigningKey,
    ttl_secs: u64,
) -> Result<String, ServiceJwtError> {
    let iat = Utc::now().timestamp();
    let mut nonce = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce);
    // Saturate rather than wrap: an absurd TTL caps at the distant future
    // instead of flipping the token already-expired.
    let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    let claims = ServiceJwtClaims {
        iss: iss.as_str().to_string(),
        aud: aud.as_str().to_string(),
        iat,
        exp: iat.saturating_add(ttl),
        jti: hex::encode(nonce),
    };

    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&HEADER)?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
    let signing_input = format!("{header}.{payload}");
    let signature = key.sign(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    Ok(format!("{signing_input}.{signature}"))
}

/// Verifies a service JWT's signature and expiry against `key` at `now`
/// (unix seconds), returning its claims.
///
/// Used by tests and by the inbound-auth layer once it has resolved the
/// issuer DID to a verifying key.
pub fn verify_service_jwt(
    token: &str,
    key: &VerifyingKey,
    now: i64,
) -> Result<ServiceJwtClaims, ServiceJwtError> {
    let mut segments = token.splitn(3, '.');
    let (header, payload, signature) = match (segments.next(), segments.next(), segments.next()) {
        (Some(h), Some(p), Some(s)) => (h, p, s),
        _ => return Err(ServiceJwtError::Malformed("expected three segments")),
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| ServiceJwtError::Malformed("header is not base64url"))?;
    let parsed_header: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|_| ServiceJwtError::Malformed("header is not JSON"))?;
    if parsed_header.get("alg").and_then(|v| v.as_str()) != Some("EdDSA") {
        return Err(ServiceJwtError::Malformed("unexpected algorithm"));
    }

    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| ServiceJwtError::Malformed("signature is not base64url"))?;
    let signature_bytes: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| ServiceJwtError::Malformed("signature has wrong length"))?;
    let signature = Signature::from_bytes(&signature_bytes);
    let signing_input = format!("{header}.{payload}");
    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_| ServiceJwtError::BadSignature)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| ServiceJwtError::Malformed("payload is not base64url"))?;
    let claims: ServiceJwtClaims = serde_json::from_slice(&payload_bytes)
        .map_err(|_| ServiceJwtError::Malformed("payload is not valid claims JSON"))?;
    if claims.exp <= now {
        return Err(ServiceJwtError::Expired(claims.exp));
    }
    Ok(claims)
}
