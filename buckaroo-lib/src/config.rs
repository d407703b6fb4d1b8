//! Gateway configuration.
//!
//! Configuration is an explicit value handed to the gateway, signer and
//! transport at construction time. There is no process-wide default.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::signature::HashMethod;
use crate::{BuckarooError, Result};

/// NVP endpoint of the test environment.
pub const TEST_URL: &str = "https://testcheckout.buckaroo.nl/nvp/";

/// NVP endpoint of the live environment.
pub const LIVE_URL: &str = "https://checkout.buckaroo.nl/nvp/";

/// Shared secret used for signing.
///
/// The value is wiped from memory on drop and never shows up in `Debug`
/// output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw secret. Do not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Gateway environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// Test environment.
    Test,
    /// Live environment.
    #[default]
    Live,
}

impl GatewayMode {
    /// Endpoint URL for this environment.
    pub fn api_url(&self) -> &'static str {
        match self {
            Self::Test => TEST_URL,
            Self::Live => LIVE_URL,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "test" => Some(Self::Test),
            "live" | "production" => Some(Self::Live),
            _ => None,
        }
    }
}

/// Configuration for talking to the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Website key, sent as `brq_websitekey`.
    pub website: String,

    /// Shared secret for signing.
    #[serde(skip_serializing)]
    pub secret: Secret,

    /// Signature digest algorithm.
    #[serde(default)]
    pub hash_method: HashMethod,

    /// Test or live environment.
    #[serde(default)]
    pub mode: GatewayMode,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Endpoint override (e.g. a local mock server).
    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

impl GatewayConfig {
    /// Create a validated configuration for the live environment.
    pub fn new(website: impl Into<String>, secret: impl Into<Secret>) -> Result<Self> {
        let config = Self {
            website: website.into(),
            secret: secret.into(),
            hash_method: HashMethod::default(),
            mode: GatewayMode::default(),
            timeout_secs: default_timeout(),
            api_url: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the digest algorithm.
    pub fn with_hash_method(mut self, hash_method: HashMethod) -> Self {
        self.hash_method = hash_method;
        self
    }

    /// Set the environment.
    pub fn with_mode(mut self, mode: GatewayMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the endpoint URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        if self.website.trim().is_empty() {
            return Err(BuckarooError::invalid_config("website", "must not be empty"));
        }
        if self.secret.is_empty() {
            return Err(BuckarooError::invalid_config("secret", "must not be empty"));
        }
        Ok(())
    }

    /// Returns true when talking to the test environment.
    pub fn is_test(&self) -> bool {
        self.mode == GatewayMode::Test
    }

    /// Endpoint URL, honouring any override.
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or_else(|| self.mode.api_url())
    }

    /// Load configuration from `BUCKAROO_*` environment variables.
    ///
    /// - `BUCKAROO_WEBSITE`, `BUCKAROO_SECRET` (required)
    /// - `BUCKAROO_HASH_METHOD` (`sha1`, `sha256`, `sha512`)
    /// - `BUCKAROO_MODE` (`test` or `live`)
    /// - `BUCKAROO_TIMEOUT` (seconds)
    /// - `BUCKAROO_API_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let website = lookup("BUCKAROO_WEBSITE")
            .ok_or_else(|| BuckarooError::invalid_config("website", "BUCKAROO_WEBSITE not set"))?;
        let secret = lookup("BUCKAROO_SECRET")
            .ok_or_else(|| BuckarooError::invalid_config("secret", "BUCKAROO_SECRET not set"))?;

        let mut config = Self::new(website, secret)?;

        if let Some(hash_method) = lookup("BUCKAROO_HASH_METHOD") {
            config = config.with_hash_method(hash_method.parse()?);
        }

        if let Some(mode) = lookup("BUCKAROO_MODE") {
            let mode = GatewayMode::parse(&mode).ok_or_else(|| {
                BuckarooError::invalid_config("mode", format!("{} (expected test or live)", mode))
            })?;
            config = config.with_mode(mode);
        }

        if let Some(timeout) = lookup("BUCKAROO_TIMEOUT") {
            let secs = timeout.parse::<u64>().map_err(|_| {
                BuckarooError::invalid_config(
                    "timeout",
                    format!("{} (expected a number of seconds)", timeout),
                )
            })?;
            config = config.with_timeout(secs);
        }

        if let Some(url) = lookup("BUCKAROO_API_URL") {
            config = config.with_api_url(url);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuckarooErrorCode;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new("12345", "secret").unwrap();

        assert_eq!(config.mode, GatewayMode::Live);
        assert_eq!(config.hash_method, HashMethod::Sha1);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.api_url(), LIVE_URL);
        assert!(!config.is_test());
    }

    #[test]
    fn test_required_fields() {
        let err = GatewayConfig::new("", "secret").unwrap_err();
        assert_eq!(err.code(), BuckarooErrorCode::InvalidConfig);
        assert!(err.to_string().contains("website"));

        let err = GatewayConfig::new("12345", "").unwrap_err();
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_mode_and_override() {
        let config = GatewayConfig::new("12345", "secret")
            .unwrap()
            .with_mode(GatewayMode::Test);
        assert_eq!(config.api_url(), TEST_URL);

        let config = config.with_api_url("http://127.0.0.1:8080/nvp/");
        assert_eq!(config.api_url(), "http://127.0.0.1:8080/nvp/");
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = GatewayConfig::new("12345", "topsecret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("REDACTED"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("topsecret"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{"website":"12345","secret":"secret","hash_method":"SHA256","mode":"test"}"#,
        )
        .unwrap();

        assert_eq!(config.hash_method, HashMethod::Sha256);
        assert_eq!(config.mode, GatewayMode::Test);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("BUCKAROO_WEBSITE", "12345"),
            ("BUCKAROO_SECRET", "secret"),
            ("BUCKAROO_HASH_METHOD", "sha512"),
            ("BUCKAROO_MODE", "TEST"),
            ("BUCKAROO_TIMEOUT", "5"),
        ]
        .into_iter()
        .collect();

        let config =
            GatewayConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.website, "12345");
        assert_eq!(config.hash_method, HashMethod::Sha512);
        assert!(config.is_test());
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let missing = GatewayConfig::from_lookup(|_| None);
        assert!(missing.is_err());

        let bad_hash = GatewayConfig::from_lookup(|name| match name {
            "BUCKAROO_WEBSITE" => Some("12345".to_string()),
            "BUCKAROO_SECRET" => Some("secret".to_string()),
            "BUCKAROO_HASH_METHOD" => Some("md5".to_string()),
            _ => None,
        });
        assert_eq!(
            bad_hash.unwrap_err().code(),
            BuckarooErrorCode::InvalidConfig
        );
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = GatewayConfig::from_lookup(|name| match name {
            "BUCKAROO_WEBSITE" => Some("12345".to_string()),
            "BUCKAROO_SECRET" => Some("secret".to_string()),
            "BUCKAROO_TIMEOUT" => Some("abc".to_string()),
            _ => None,
        })
        .unwrap_err();

        assert_eq!(err.code(), BuckarooErrorCode::InvalidConfig);
        assert_eq!(
            err.to_string(),
            "invalid configuration timeout: abc (expected a number of seconds)"
        );
    }
}
