//! HTTP transport backed by reqwest.
//!
//! # Feature Flags
//!
//! Real requests need the `http-transport` feature. Without it every call
//! returns an `Unimplemented` error.
//!
//! ```toml
//! [dependencies]
//! buckaroo-lib = { version = "0.1", features = ["http-transport"] }
//! ```

use async_trait::async_trait;
#[cfg(feature = "http-transport")]
use std::time::Duration;

use super::Transport;
use crate::config::GatewayConfig;
#[cfg(feature = "http-transport")]
use crate::BuckarooError;
use crate::Result;

/// Sends requests over HTTPS with a per-request timeout.
pub struct HttpTransport {
    timeout_secs: u64,
    #[cfg(feature = "http-transport")]
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport honoring the configured timeout.
    #[cfg(feature = "http-transport")]
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BuckarooError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// Create a transport (stub when feature disabled).
    #[cfg(not(feature = "http-transport"))]
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Ok(Self {
            timeout_secs: config.timeout_secs,
        })
    }

    /// Configured timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    #[cfg(feature = "http-transport")]
    fn map_reqwest_error(&self, url: &str, e: reqwest::Error) -> BuckarooError {
        if e.is_timeout() {
            BuckarooError::ConnectionTimeout {
                operation: "gateway request".to_string(),
                timeout_ms: self.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            BuckarooError::ConnectionFailed {
                target: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            BuckarooError::Transport(format!("Gateway request failed: {}", e))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[cfg(feature = "http-transport")]
    async fn post_form(&self, url: &str, body: String) -> Result<Vec<u8>> {
        tracing::debug!(url, bytes = body.len(), "posting request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuckarooError::InvalidResponse {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http-transport"))]
    async fn post_form(&self, _url: &str, _body: String) -> Result<Vec<u8>> {
        Err(crate::BuckarooError::Unimplemented(
            "HTTP transport not compiled - enable the 'http-transport' feature",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_from_config() {
        let config = GatewayConfig::new("12345", "secret")
            .unwrap()
            .with_timeout(5);
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.timeout_secs(), 5);
    }

    #[cfg(not(feature = "http-transport"))]
    #[tokio::test]
    async fn test_stub_is_unimplemented() {
        let config = GatewayConfig::new("12345", "secret").unwrap();
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport
            .post_form("https://localhost/nvp/", String::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::BuckarooErrorCode::Unimplemented);
    }
}
