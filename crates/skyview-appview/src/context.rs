//! Process-wide application context shared across request handlers.
//!
//! One [`AppContext`] is constructed at startup from fully-resolved
//! configuration and shared read-only (behind an `Arc`) by every
//! concurrently handled request. Nothing on it mutates after construction,
//! so no locking is involved anywhere in the request path.

use crate::clients::{
    AuthVerifier, BsyncClient, CourierClient, DataPlaneClient, Hydrator, IdResolver, PlcClient,
    SearchClient, Views,
};
use crate::config::ServiceConfig;
use crate::labeler_header::{
    default_labelers, parse_labeler_header, ACCEPT_LABELERS_HEADER,
};
use crate::service_jwt::{create_service_jwt, ServiceJwtError};
use axum::http::HeaderMap;
use ed25519_dalek::SigningKey;
use skyview_types::{Did, DidError, TrustedLabelers};
use std::sync::Arc;
use thiserror::Error;

/// Errors that abort startup during context construction.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The configured signing key is not valid hex or not a 32-byte seed.
    #[error("invalid signing key material: {0}")]
    InvalidSigningKey(String),

    /// The configured service DID failed syntactic validation.
    #[error("invalid server DID in configuration: {0}")]
    InvalidServerDid(#[source] DidError),

    /// A configured default labeler DID failed syntactic validation.
    #[error("invalid default labeler DID {raw:?}: {source}")]
    InvalidLabelerDid {
        raw: String,
        #[source]
        source: DidError,
    },

    /// The configured service JWT TTL is zero; expiry must be strictly in
    /// the future at issuance.
    #[error("service_jwt_ttl_secs must be at least 1")]
    InvalidJwtTtl,

    /// The shared outbound HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Everything an [`AppContext`] is made of.
///
/// All required collaborators are taken by value, so a context missing one
/// is unrepresentable; the fallible part of startup is assembling these
/// options from configuration via [`ContextOptions::from_config`].
pub struct ContextOptions {
    pub cfg: ServiceConfig,
    pub server_did: Did,
    pub dataplane: DataPlaneClient,
    pub search: Option<SearchClient>,
    pub hydrator: Hydrator,
    pub views: Views,
    pub signing_key: Arc<SigningKey>,
    pub id_resolver: IdResolver,
    pub bsync: BsyncClient,
    pub courier: CourierClient,
    pub auth_verifier: AuthVerifier,
    /// Default trusted-labeler DIDs, already validated, in configured order.
    pub default_labeler_dids: Vec<Did>,
}

impl ContextOptions {
    /// Builds the full collaborator set from configuration.
    ///
    /// # Errors
    ///
    /// Any invalid signing key or DID here is a misconfiguration and fatal
    /// to startup; per-request operations never see a half-built context.
    pub fn from_config(cfg: ServiceConfig) -> Result<Self, ContextError> {
        if cfg.service_jwt_ttl_secs == 0 {
            return Err(ContextError::InvalidJwtTtl);
        }
        let server_did = Did::new(&cfg.server_did).map_err(ContextError::InvalidServerDid)?;

        let seed = hex::decode(&cfg.signing_key_hex)
            .map_err(|e| ContextError::InvalidSigningKey(e.to_string()))?;
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|bytes: Vec<u8>| {
                ContextError::InvalidSigningKey(format!(
                    "expected 32-byte Ed25519 seed, got {} bytes",
                    bytes.len()
                ))
            })?;
        let signing_key = Arc::new(SigningKey::from_bytes(&seed));

        let default_labeler_dids = cfg
            .labels_from_issuer_dids
            .iter()
            .map(|raw| {
                Did::new(raw).map_err(|source| ContextError::InvalidLabelerDid {
                    raw: raw.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let http = reqwest::Client::builder().build()?;
        let dataplane = DataPlaneClient::new(&cfg.dataplane_url, http.clone());
        let search = cfg
            .search_url
            .as_deref()
            .map(|url| SearchClient::new(url, http.clone()));
        let id_resolver = IdResolver::new(&cfg.plc_directory_url, http.clone());

        Ok(Self {
            hydrator: Hydrator::new(dataplane.clone()),
            views: Views::new(),
            auth_verifier: AuthVerifier::new(server_did.clone(), id_resolver.clone()),
            bsync: BsyncClient::new(&cfg.bsync_url, http.clone()),
            courier: CourierClient::new(&cfg.courier_url, http),
            dataplane,
            search,
            signing_key,
            id_resolver,
            server_did,
            default_labeler_dids,
            cfg,
        })
    }
}

/// Immutable aggregation of everything this running service is made of.
///
/// Accessors are plain reads with two exceptions: [`AppContext::plc_client`]
/// is a factory, and the derived operations
/// ([`AppContext::service_auth_jwt`], [`AppContext::req_labelers`]) compute
/// request-scoped values from the fixed process-wide state.
pub struct AppContext {
    cfg: ServiceConfig,
    server_did: Did,
    dataplane: DataPlaneClient,
    search: Option<SearchClient>,
    hydrator: Hydrator,
    views: Views,
    signing_key: Arc<SigningKey>,
    id_resolver: IdResolver,
    bsync: BsyncClient,
    courier: CourierClient,
    auth_verifier: AuthVerifier,
    default_labelers: TrustedLabelers,
}

impl AppContext {
    pub fn new(opts: ContextOptions) -> Self {
        Self {
            default_labelers: default_labelers(&opts.default_labeler_dids),
            cfg: opts.cfg,
            server_did: opts.server_did,
            dataplane: opts.dataplane,
            search: opts.search,
            hydrator: opts.hydrator,
            views: opts.views,
            signing_key: opts.signing_key,
            id_resolver: opts.id_resolver,
            bsync: opts.bsync,
            courier: opts.courier,
            auth_verifier: opts.auth_verifier,
        }
    }

    /// Loads a context directly from configuration.
    pub fn from_config(cfg: ServiceConfig) -> Result<Self, ContextError> {
        Ok(Self::new(ContextOptions::from_config(cfg)?))
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.cfg
    }

    /// This service's own DID, used as `iss` on outbound service JWTs.
    pub fn server_did(&self) -> &Did {
        &self.server_did
    }

    pub fn dataplane(&self) -> &DataPlaneClient {
        &self.dataplane
    }

    pub fn search_client(&self) -> Option<&SearchClient> {
        self.search.as_ref()
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn id_resolver(&self) -> &IdResolver {
        &self.id_resolver
    }

    pub fn bsync(&self) -> &BsyncClient {
        &self.bsync
    }

    pub fn courier(&self) -> &CourierClient {
        &self.courier
    }

    pub fn auth_verifier(&self) -> &AuthVerifier {
        &self.auth_verifier
    }

    /// Default trusted-labeler set, in configured order.
    pub fn default_labelers(&self) -> &TrustedLabelers {
        &self.default_labelers
    }

    /// Constructs a fresh PLC directory client.
    ///
    /// Deliberately a factory, not a memoized field: the client carries no
    /// state worth reusing, and constructing per call keeps that obvious.
    pub fn plc_client(&self) -> PlcClient {
        PlcClient::new(&self.cfg.plc_directory_url)
    }

    /// Mints a service JWT asserting this service's identity to `aud`.
    ///
    /// # Errors
    ///
    /// A signing-path failure surfaces to the caller of the outbound call
    /// that needed the token; it never takes the process down.
    pub fn service_auth_jwt(&self, aud: &Did) -> Result<String, ServiceJwtError> {
        create_service_jwt(
            &self.server_did,
            aud,
            &self.signing_key,
            self.cfg.service_jwt_ttl_secs,
        )
    }

    /// Resolves the trusted-labeler set from a raw header value.
    ///
    /// A malformed header never fails the request: the rejection is logged
    /// with the offending value and the configured default set is used.
    pub fn labelers_from_header(&self, value: Option<&str>) -> TrustedLabelers {
        match parse_labeler_header(value) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => self.default_labelers.clone(),
            Err(err) => {
                tracing::info!(
                    value = value.unwrap_or_default(),
                    %err,
                    "failed to parse accept-labelers header, using default labelers"
                );
                self.default_labelers.clone()
            }
        }
    }

    /// Resolves the trusted-labeler set for an inbound request.
    ///
    /// A header that is not valid UTF-8 is treated the same as a malformed
    /// one: logged and replaced with the default set.
    pub fn req_labelers(&self, headers: &HeaderMap) -> TrustedLabelers {
        match headers.get(ACCEPT_LABELERS_HEADER) {
            None => self.labelers_from_header(None),
            Some(value) => match value.to_str() {
                Ok(value) => self.labelers_from_header(Some(value)),
                Err(_) => {
                    tracing::info!(
                        value = ?value,
                        "accept-labelers header is not valid UTF-8, using default labelers"
                    );
                    self.default_labelers.clone()
                }
            },
        }
    }
}
