//! Error types for the thread client library.

use thiserror::Error;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur when fetching or normalizing threads.
///
/// Navigation itself never produces errors: movement methods on
/// [`ThreadNavigator`](crate::ThreadNavigator) report an impossible move as a
/// `false` return instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream thread fetch failed (network, HTTP error, auth).
    ///
    /// Carries the message reported by the underlying source. Retrying is
    /// the source's business, not this library's.
    #[error("thread fetch failed: {0}")]
    Fetch(String),

    /// The fetch was deliberately aborted through a cancellation token.
    ///
    /// Kept separate from [`Error::Fetch`] so callers can suppress
    /// user-facing error handling when they cancelled the request themselves.
    #[error("thread fetch cancelled")]
    Cancelled,

    /// The root of the fetched thread is not a viewable post
    /// (deleted, blocked, or an unrecognized variant).
    ///
    /// Unavailable posts deeper in the reply tree are filtered silently;
    /// only an unavailable root is an error, since no thread can be built
    /// without a root post.
    #[error("thread root is unavailable: {0}")]
    RootUnavailable(String),

    /// The raw response could not be decoded as a thread view.
    #[error("invalid thread response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl Error {
    /// Check whether this error represents a deliberate cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
