//! Mock thread source for testing purposes.
//!
//! This module provides a scripted [`ThreadSource`] implementation so
//! processor and navigator behavior can be tested without a network or a
//! live AT Protocol appview.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::RawThreadNode;
use crate::error::{Error, Result};
use crate::processor::ThreadSource;

/// A mock thread source backed by canned responses.
///
/// Threads are registered per root URI with [`with_thread`](Self::with_thread);
/// fetching an unregistered URI fails like a real source would. Every request
/// is recorded so tests can assert on the URIs and depths that were asked
/// for, and an optional artificial delay makes cancellation testable.
#[derive(Debug, Default)]
pub struct MockThreadSource {
    threads: HashMap<String, RawThreadNode>,
    failure: Option<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<(String, u16)>>,
}

impl MockThreadSource {
    /// Create an empty mock source. Every fetch fails until threads are
    /// registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source where every fetch fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Register a canned raw thread for the given root URI.
    pub fn with_thread(mut self, uri: impl Into<String>, thread: RawThreadNode) -> Self {
        self.threads.insert(uri.into(), thread);
        self
    }

    /// Sleep for `delay` before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All `(uri, depth)` pairs fetched so far, in request order.
    pub fn requests(&self) -> Vec<(String, u16)> {
        self.requests.lock().expect("mock request log poisoned").clone()
    }

    /// Number of fetches made so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mock request log poisoned").len()
    }
}

#[async_trait]
impl ThreadSource for MockThreadSource {
    async fn fetch_thread(&self, uri: &str, depth: u16) -> Result<RawThreadNode> {
        self.requests
            .lock()
            .expect("mock request log poisoned")
            .push((uri.to_string(), depth));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(Error::Fetch(message.clone()));
        }

        self.threads
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("no thread for {uri}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthorView, PostView};

    fn make_post(uri: &str) -> PostView {
        PostView {
            uri: uri.to_string(),
            cid: format!("cid-{uri}"),
            author: AuthorView {
                did: "did:plc:test".to_string(),
                handle: "test.bsky.social".to_string(),
                display_name: None,
                avatar: None,
            },
            record: serde_json::Value::Null,
            indexed_at: "2024-03-01T10:00:00Z".to_string(),
            reply_count: None,
            repost_count: None,
            like_count: None,
        }
    }

    #[tokio::test]
    async fn test_registered_thread_is_returned() {
        let source = MockThreadSource::new()
            .with_thread("at://root", RawThreadNode::post(make_post("at://root")));

        let raw = source.fetch_thread("at://root", 6).await.unwrap();
        assert!(raw.is_post());
        assert_eq!(source.requests(), vec![("at://root".to_string(), 6)]);
    }

    #[tokio::test]
    async fn test_unregistered_uri_fails() {
        let source = MockThreadSource::new();
        let err = source.fetch_thread("at://nope", 6).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = MockThreadSource::failing("boom")
            .with_thread("at://root", RawThreadNode::post(make_post("at://root")));

        let err = source.fetch_thread("at://root", 6).await.unwrap_err();
        assert_eq!(err.to_string(), "thread fetch failed: boom");
    }
}
