//! Delivery of signed request bodies to the gateway.
//!
//! The gateway core is synchronous; only the [`Transport`] seam is async so
//! that callers can bring their own HTTP client or a mock.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::Result;

/// Posts a form-encoded body and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` as `application/x-www-form-urlencoded`.
    ///
    /// Implementations return the body of a 2xx response unchanged and map
    /// any other outcome to an error. No retries are performed.
    async fn post_form(&self, url: &str, body: String) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post_form(&self, url: &str, body: String) -> Result<Vec<u8>> {
        (**self).post_form(url, body).await
    }
}
