//! Collaborator client handles owned by the app context.
//!
//! Each subsystem the appview composes is independently owned; this module
//! defines only the thin, immutable handles the context holds and hands out.
//! Handles are cheap to clone (a `reqwest::Client` is an `Arc` over its
//! connection pool) and safe to share across concurrent requests.

use skyview_types::Did;

/// Client for the data-plane read service backing all hydration.
#[derive(Debug, Clone)]
pub struct DataPlaneClient {
    http: reqwest::Client,
    base_url: String,
}

impl DataPlaneClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Client for the optional search service.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Client for the bsync service (mute-state sync and operation broadcast).
#[derive(Debug, Clone)]
pub struct BsyncClient {
    http: reqwest::Client,
    base_url: String,
}

impl BsyncClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Client for the courier service (moderation-event delivery).
#[derive(Debug, Clone)]
pub struct CourierClient {
    http: reqwest::Client,
    base_url: String,
}

impl CourierClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Handle to the content hydration pipeline.
///
/// Hydration itself lives with its owning subsystem; the context only needs
/// a handle bound to the data plane it reads from.
#[derive(Debug, Clone)]
pub struct Hydrator {
    dataplane: DataPlaneClient,
}

impl Hydrator {
    pub fn new(dataplane: DataPlaneClient) -> Self {
        Self { dataplane }
    }

    pub fn dataplane(&self) -> &DataPlaneClient {
        &self.dataplane
    }
}

/// Handle to the view-rendering layer.
///
/// Rendering is pure over hydrated state and carries no connection state of
/// its own in this core.
#[derive(Debug, Clone, Default)]
pub struct Views;

impl Views {
    pub fn new() -> Self {
        Self
    }
}

/// Handle to the identity resolver (DID → DID document / signing key).
#[derive(Debug, Clone)]
pub struct IdResolver {
    http: reqwest::Client,
    plc_url: String,
}

impl IdResolver {
    pub fn new(plc_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            plc_url: plc_url.into(),
        }
    }

    pub fn plc_url(&self) -> &str {
        &self.plc_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Verifier for *inbound* request credentials.
///
/// Verification logic is owned upstream; the context holds the handle bound
/// to this service's own DID so handlers can reach it.
#[derive(Debug, Clone)]
pub struct AuthVerifier {
    own_did: Did,
    id_resolver: IdResolver,
}

impl AuthVerifier {
    pub fn new(own_did: Did, id_resolver: IdResolver) -> Self {
        Self {
            own_did,
            id_resolver,
        }
    }

    pub fn own_did(&self) -> &Did {
        &self.own_did
    }

    pub fn id_resolver(&self) -> &IdResolver {
        &self.id_resolver
    }
}

/// Client for the PLC directory.
///
/// Unlike the other handles, this one is constructed fresh on every use: it
/// is stateless apart from the base URL, so there is nothing worth caching,
/// and a factory keeps that contract obvious.
#[derive(Debug, Clone)]
pub struct PlcClient {
    http: reqwest::Client,
    base_url: String,
}

impl PlcClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the current DID document for `did` from the directory.
    pub async fn did_document(&self, did: &Did) -> Result<serde_json::Value, reqwest::Error> {
        self.http
            .get(format!("{}/{}", self.base_url, did))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
