//! In-memory transport that records requests.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::transport::Transport;
use crate::{BuckarooError, Result};

/// A request seen by [`MockTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Full URL including the `op` query.
    pub url: String,
    /// Form-encoded body.
    pub body: String,
}

impl RecordedRequest {
    /// Value of the `op` query parameter.
    pub fn operation(&self) -> Option<&str> {
        self.url.split_once("op=").map(|(_, op)| op)
    }
}

/// Replays queued responses in order.
///
/// When the queue is empty, calls fail with a transport error.
#[derive(Default)]
pub struct MockTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    replies: Mutex<VecDeque<Result<Vec<u8>>>>,
}

impl MockTransport {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub async fn push_body(&self, body: impl Into<Vec<u8>>) {
        self.replies.lock().await.push_back(Ok(body.into()));
    }

    /// Queue a failure.
    pub async fn push_error(&self, error: BuckarooError) {
        self.replies.lock().await.push_back(Err(error));
    }

    /// Requests seen so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of queued responses not yet consumed.
    pub async fn pending_replies(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_form(&self, url: &str, body: String) -> Result<Vec<u8>> {
        self.requests.lock().await.push(RecordedRequest {
            url: url.to_string(),
            body,
        });

        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(BuckarooError::Transport("no mock response queued".into())))
    }
}
