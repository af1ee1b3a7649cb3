//! Fetching and normalizing raw thread responses.
//!
//! The processor sits between the network and the navigator. It asks a
//! [`ThreadSource`] for the raw tagged-union response, drops every reply
//! entry that is not a viewable post, and hands back a strictly-typed
//! [`Thread`] tree. Where the data came from (XRPC call, cache, fixture) is
//! entirely the source's concern.

use async_trait::async_trait;
use log::{debug, trace};
use tokio_util::sync::CancellationToken;

use crate::api::{PostView, RawThreadNode};
use crate::error::{Error, Result};
use crate::thread::Thread;

/// How many reply levels the upstream API is asked to expand when the caller
/// does not say otherwise.
pub const DEFAULT_FETCH_DEPTH: u16 = 11;

/// A source of raw thread data, keyed by the root post's AT-URI.
///
/// This is the single inbound dependency of the library. Implementations
/// wrap whatever actually produces the data (an `app.bsky.feed.getPostThread`
/// call, a local cache, or [`MockThreadSource`](crate::mock::MockThreadSource)
/// in tests) and report failures as [`Error::Fetch`].
#[async_trait]
pub trait ThreadSource {
    /// Fetch the raw thread rooted at `uri`, expanding up to `depth` levels
    /// of replies.
    async fn fetch_thread(&self, uri: &str, depth: u16) -> Result<RawThreadNode>;
}

/// Normalize a raw thread node into a [`Thread`] tree.
///
/// The root must be a viewable post; anything else fails with
/// [`Error::RootUnavailable`]. Below the root, reply entries that are
/// not viewable posts are dropped silently at every level, so normalization
/// of a payload with a valid root never fails.
pub fn normalize(raw: RawThreadNode) -> Result<Thread> {
    match raw {
        RawThreadNode::ThreadViewPost { post, replies } => {
            let mut dropped = 0;
            let thread = normalize_view(post, replies, &mut dropped);
            if dropped > 0 {
                debug!(
                    "normalized thread {}: dropped {dropped} unavailable replies",
                    thread.post.uri
                );
            }
            Ok(thread)
        }
        RawThreadNode::NotFoundPost { uri, .. } => {
            Err(Error::RootUnavailable(format!("not found: {uri}")))
        }
        RawThreadNode::BlockedPost { uri, .. } => {
            Err(Error::RootUnavailable(format!("blocked: {uri}")))
        }
        RawThreadNode::Unknown => Err(Error::RootUnavailable(
            "unrecognized thread variant".to_string(),
        )),
    }
}

// Recursion depth is bounded by the expansion depth requested from the
// source, not by total thread size.
fn normalize_view(
    post: PostView,
    replies: Option<Vec<RawThreadNode>>,
    dropped: &mut usize,
) -> Thread {
    let kept: Vec<Thread> = replies
        .into_iter()
        .flatten()
        .filter_map(|node| match node {
            RawThreadNode::ThreadViewPost { post, replies } => {
                Some(normalize_view(post, replies, dropped))
            }
            _ => {
                *dropped += 1;
                None
            }
        })
        .collect();

    Thread {
        post,
        replies: if kept.is_empty() { None } else { Some(kept) },
    }
}

/// Fetches raw threads through a [`ThreadSource`] and normalizes them.
///
/// # Example
///
/// ```no_run
/// use bsky_threads::{ThreadNavigator, ThreadProcessor};
/// # use bsky_threads::mock::MockThreadSource;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let source = MockThreadSource::new();
/// let processor = ThreadProcessor::new(source);
/// let thread = processor
///     .fetch_and_normalize("at://did:plc:abc/app.bsky.feed.post/3k2a")
///     .await?;
/// let nav = ThreadNavigator::build(thread, None);
/// println!("{} posts in thread", nav.post_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ThreadProcessor<S> {
    source: S,
}

impl<S: ThreadSource> ThreadProcessor<S> {
    /// Create a processor over the given source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the thread rooted at `uri` at [`DEFAULT_FETCH_DEPTH`] and
    /// normalize it.
    pub async fn fetch_and_normalize(&self, uri: &str) -> Result<Thread> {
        self.fetch_and_normalize_with_depth(uri, DEFAULT_FETCH_DEPTH)
            .await
    }

    /// Fetch the thread rooted at `uri`, expanding `depth` reply levels, and
    /// normalize it.
    pub async fn fetch_and_normalize_with_depth(&self, uri: &str, depth: u16) -> Result<Thread> {
        trace!("fetching thread {uri} at depth {depth}");
        let raw = self.source.fetch_thread(uri, depth).await?;
        normalize(raw)
    }

    /// Like [`fetch_and_normalize_with_depth`](Self::fetch_and_normalize_with_depth),
    /// but aborts with [`Error::Cancelled`] when `cancel` fires first.
    ///
    /// Cancellation is reported distinctly from fetch failures so callers can
    /// stay quiet about requests they abandoned on purpose.
    pub async fn fetch_and_normalize_cancellable(
        &self,
        uri: &str,
        depth: u16,
        cancel: &CancellationToken,
    ) -> Result<Thread> {
        tokio::select! {
            _ = cancel.cancelled() => {
                trace!("fetch of {uri} cancelled");
                Err(Error::Cancelled)
            }
            result = self.fetch_and_normalize_with_depth(uri, depth) => result,
        }
    }
}
