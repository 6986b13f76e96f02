//! Relying-party client configuration.
//!
//! A [`ClientConfig`] is built once and handed to [`AuthorizationFlow`]
//! and the CLI. Defaults describe the public Solid-OIDC test client, so an
//! empty TOML file is a usable configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! client_id = "https://app.example/id"
//! redirect_uri = "https://app.example/callback"
//! pkce_method = "S256"
//! dpop_curve = "P-384"
//!
//! [http]
//! request_timeout = "5s"
//! max_response_size = 65536
//! ```
//!
//! [`AuthorizationFlow`]: crate::oidc::AuthorizationFlow

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::crypto::EcCurve;
use crate::pkce::PkceChallengeMethod;

/// Client id of the public Solid-OIDC test client.
pub const DEFAULT_CLIENT_ID: &str = "https://solid.github.io/solid-oidc/test/data/tester.jsonld";

/// Redirect URI registered for the public Solid-OIDC test client.
pub const DEFAULT_REDIRECT_URI: &str = "https://solid.github.io/solid-oidc/test/callback.html";

/// Published requirement data for the Solid-OIDC specification.
pub const DEFAULT_SPECIFICATION_DATA: &str =
    "https://solid.github.io/solid-oidc/test/data/solid-oidc.jsonld";

/// Settings for one relying-party client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// OAuth client identifier. For Solid this is a dereferenceable URL.
    pub client_id: String,

    /// Where the provider redirects after authorization.
    pub redirect_uri: String,

    /// PKCE challenge method sent with the authorization request.
    pub pkce_method: PkceChallengeMethod,

    /// URL of the requirement catalog used to annotate conformance reports.
    pub specification_data: Option<String>,

    /// Curve of the per-attempt DPoP key.
    pub dpop_curve: EcCurve,

    /// HTTP client settings.
    pub http: HttpConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            pkce_method: PkceChallengeMethod::S256,
            specification_data: Some(DEFAULT_SPECIFICATION_DATA.to_string()),
            dpop_curve: EcCurve::P256,
            http: HttpConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// HTTP request timeout (default: 10 seconds).
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Maximum response size in bytes (default: 1 MB).
    pub max_response_size: usize,

    /// Whether to allow plain HTTP URLs.
    /// This should only be enabled for testing.
    pub allow_http: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10), // 10 seconds
            max_response_size: 1024 * 1024,           // 1 MB
            allow_http: false,
        }
    }
}

impl HttpConfig {
    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum response size.
    #[must_use]
    pub fn with_max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }

    /// Allows HTTP URLs (for testing only).
    #[must_use]
    pub fn allow_http(mut self) -> Self {
        self.allow_http = true;
        self
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(String),
}

impl ClientConfig {
    /// Parses a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Missing` if the client id or redirect URI is empty
    /// - `ConfigError::InvalidValue` if the redirect URI or specification data
    ///   URL is not an absolute URL, or the HTTP limits are zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("client_id".to_string()));
        }

        if self.redirect_uri.trim().is_empty() {
            return Err(ConfigError::Missing("redirect_uri".to_string()));
        }
        Url::parse(&self.redirect_uri).map_err(|e| {
            ConfigError::InvalidValue(format!(
                "redirect_uri '{}' is not an absolute URL: {e}",
                self.redirect_uri
            ))
        })?;

        if let Some(data) = &self.specification_data {
            Url::parse(data).map_err(|e| {
                ConfigError::InvalidValue(format!(
                    "specification_data '{data}' is not an absolute URL: {e}"
                ))
            })?;
        }

        if self.http.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "http.request_timeout must be > 0".to_string(),
            ));
        }

        if self.http.max_response_size == 0 {
            return Err(ConfigError::InvalidValue(
                "http.max_response_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.pkce_method, PkceChallengeMethod::S256);
        assert_eq!(config.dpop_curve, EcCurve::P256);
        assert_eq!(config.http.request_timeout, Duration::from_secs(10));
        assert!(!config.http.allow_http);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = ClientConfig::from_toml_str(
            r#"
            client_id = "https://app.example/id"
            dpop_curve = "P-521"

            [http]
            request_timeout = "5s"
            allow_http = true
            "#,
        )
        .unwrap();

        assert_eq!(config.client_id, "https://app.example/id");
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.dpop_curve, EcCurve::P521);
        assert_eq!(config.http.request_timeout, Duration::from_secs(5));
        assert!(config.http.allow_http);
        assert_eq!(config.http.max_response_size, 1024 * 1024);
    }

    #[test]
    fn test_plain_pkce_method_rejected() {
        let err = ClientConfig::from_toml_str(r#"pkce_method = "plain""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_client_id_fails_validation() {
        let config = ClientConfig {
            client_id: String::new(),
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref f) if f == "client_id"));
    }

    #[test]
    fn test_relative_redirect_uri_fails_validation() {
        let config = ClientConfig {
            redirect_uri: "/callback".to_string(),
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("redirect_uri"));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let config = ClientConfig {
            http: HttpConfig::default().with_request_timeout(Duration::ZERO),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"redirect_uri = "https://app.example/cb""#).unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.redirect_uri, "https://app.example/cb");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientConfig::load("/nonexistent/solid-oidc.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_http_config_builders() {
        let http = HttpConfig::default()
            .with_request_timeout(Duration::from_secs(3))
            .with_max_response_size(4096)
            .allow_http();
        assert_eq!(http.request_timeout, Duration::from_secs(3));
        assert_eq!(http.max_response_size, 4096);
        assert!(http.allow_http);
    }
}
