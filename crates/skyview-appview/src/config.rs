//! Appview configuration loading from file and environment variables.

use serde::Deserialize;
use thiserror::Error;

/// Top-level appview configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service identity and collaborator endpoints.
    pub service: ServiceConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Service identity, key material, and collaborator endpoints.
///
/// These values arrive already validated in shape (URLs are URLs, the key is
/// hex); semantic validation (key length, DID syntax) happens when the app
/// context is constructed, and failure there aborts startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// DID this service asserts as `iss` on outbound service JWTs.
    pub server_did: String,

    /// Hex-encoded 32-byte Ed25519 seed for the service signing key.
    pub signing_key_hex: String,

    /// Base URL of the PLC directory.
    #[serde(default = "default_plc_directory_url")]
    pub plc_directory_url: String,

    /// Labeler DIDs applied when a request declares no trusted labelers
    /// (or declares them malformed).
    #[serde(default)]
    pub labels_from_issuer_dids: Vec<String>,

    /// Validity window for outbound service JWTs, in seconds.
    #[serde(default = "default_service_jwt_ttl_secs")]
    pub service_jwt_ttl_secs: u64,

    /// Data-plane service endpoint.
    pub dataplane_url: String,

    /// Search service endpoint. Search is optional; when unset the context
    /// carries no search client.
    #[serde(default)]
    pub search_url: Option<String>,

    /// Bsync (sync/broadcast) service endpoint.
    pub bsync_url: String,

    /// Courier (moderation-event delivery) service endpoint.
    pub courier_url: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "skyview_appview=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_plc_directory_url() -> String {
    "https://plc.directory".to_string()
}

fn default_service_jwt_ttl_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found at the resolved path.
    ///
    /// Unlike a generic server, the appview cannot fall back to defaults:
    /// its identity and signing key have no sensible default values.
    #[error("config file not found: {0}")]
    NotFound(String),

    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file.
///
/// Environment variable overrides:
/// - `SKYVIEW_SERVER_DID` overrides `service.server_did`
/// - `SKYVIEW_SIGNING_KEY_HEX` overrides `service.signing_key_hex`
/// - `SKYVIEW_PLC_DIRECTORY_URL` overrides `service.plc_directory_url`
/// - `SKYVIEW_DATAPLANE_URL` overrides `service.dataplane_url`
/// - `SKYVIEW_LOG_LEVEL` overrides `logging.level`
/// - `SKYVIEW_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file is missing, unreadable, or malformed.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_string()));
        }
        Err(e) => return Err(ConfigError::FileRead(e)),
    };
    let mut config: Config = toml::from_str(&contents)?;

    // Environment variable overrides
    if let Ok(did) = std::env::var("SKYVIEW_SERVER_DID") {
        config.service.server_did = did;
    }
    if let Ok(key) = std::env::var("SKYVIEW_SIGNING_KEY_HEX") {
        config.service.signing_key_hex = key;
    }
    if let Ok(url) = std::env::var("SKYVIEW_PLC_DIRECTORY_URL") {
        config.service.plc_directory_url = url;
    }
    if let Ok(url) = std::env::var("SKYVIEW_DATAPLANE_URL") {
        config.service.dataplane_url = url;
    }
    if let Ok(level) = std::env::var("SKYVIEW_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("SKYVIEW_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [service]
        server_did = "did:web:appview.example.com"
        signing_key_hex = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60"
        dataplane_url = "http://localhost:2510"
        bsync_url = "http://localhost:2520"
        courier_url = "http://localhost:2530"
    "#;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.service.server_did, "did:web:appview.example.com");
        assert_eq!(config.service.plc_directory_url, "https://plc.directory");
        assert_eq!(config.service.service_jwt_ttl_secs, 60);
        assert!(config.service.labels_from_issuer_dids.is_empty());
        assert!(config.service.search_url.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn rejects_config_missing_identity() {
        let result = toml::from_str::<Config>(
            r#"
            [service]
            dataplane_url = "http://localhost:2510"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn parses_labeler_defaults_in_order() {
        let config: Config = toml::from_str(&format!(
            "{MINIMAL}\nlabels_from_issuer_dids = [\"did:plc:b\", \"did:plc:a\"]"
        ))
        .unwrap();
        assert_eq!(
            config.service.labels_from_issuer_dids,
            ["did:plc:b", "did:plc:a"]
        );
    }

    #[test]
    fn load_config_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-config.toml");
        assert!(matches!(
            load_config(path.to_str().unwrap()),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn load_config_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not toml [").unwrap();
        assert!(matches!(
            load_config(path.to_str().unwrap()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_config_env_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        // Process-global: this is the only test that sets SKYVIEW_* vars, so
        // it asserts the full before/after itself rather than sharing state.
        std::env::set_var("SKYVIEW_SERVER_DID", "did:web:override.example.com");
        std::env::set_var("SKYVIEW_LOG_JSON", "true");
        let config = load_config(path.to_str().unwrap()).unwrap();
        std::env::remove_var("SKYVIEW_SERVER_DID");
        std::env::remove_var("SKYVIEW_LOG_JSON");

        assert_eq!(config.service.server_did, "did:web:override.example.com");
        assert!(config.logging.json);
        // Untouched fields still come from the file.
        assert_eq!(config.service.dataplane_url, "http://localhost:2510");

        // With the vars gone, the file values win again.
        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.service.server_did, "did:web:appview.example.com");
        assert!(!config.logging.json);
    }
}
