//! # bsky-threads
//!
//! A thread-tree model and cursor navigator for Bluesky (AT Protocol)
//! discussion threads.
//!
//! This library takes the raw nested response of a thread fetch, normalizes
//! it into a strictly-typed reply tree, and exposes a navigator over that
//! tree: O(1) structural lookups by post URI, a chronological flat ordering
//! for linear next/prev traversal, and a single reactive cursor that UI
//! layers can subscribe to.
//!
//! ## Design Philosophy
//!
//! The library is deliberately I/O-agnostic:
//! - **Model and navigation**: tree building, ordering, and cursor movement
//!   are pure, synchronous computations over one immutable thread snapshot
//! - **I/O separation**: where raw thread data comes from is hidden behind
//!   the [`ThreadSource`] trait; callers plug in an XRPC client, a cache, or
//!   the bundled [`mock::MockThreadSource`]
//! - **No rendering**: the navigator hands out posts and positions; what a
//!   "current post" looks like on screen is the caller's business
//!
//! ## Examples
//!
//! ### Navigating a normalized thread
//!
//! ```
//! use bsky_threads::{normalize, RawThreadNode, ThreadNavigator};
//! use serde_json::json;
//!
//! let raw: RawThreadNode = serde_json::from_value(json!({
//!     "$type": "app.bsky.feed.defs#threadViewPost",
//!     "post": {
//!         "uri": "at://did:plc:abc/app.bsky.feed.post/root",
//!         "cid": "bafyroot",
//!         "author": {"did": "did:plc:abc", "handle": "alice.bsky.social"},
//!         "record": {"text": "hello"},
//!         "indexedAt": "2024-03-01T10:00:00Z"
//!     }
//! }))?;
//!
//! let nav = ThreadNavigator::build(normalize(raw)?, None);
//! assert_eq!(nav.cursor().as_deref(), Some(nav.root_uri()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Fetching through a source
//!
//! ```no_run
//! use bsky_threads::{ThreadNavigator, ThreadProcessor};
//! # use bsky_threads::mock::MockThreadSource;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let source = MockThreadSource::new();
//! let processor = ThreadProcessor::new(source);
//! let thread = processor
//!     .fetch_and_normalize("at://did:plc:abc/app.bsky.feed.post/3k2a")
//!     .await?;
//!
//! let nav = ThreadNavigator::build(thread, None);
//! while nav.move_to_next() {
//!     if let Some(post) = nav.current_post() {
//!         println!("@{}: {:?}", post.author.handle, post.text());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod mock;
pub mod navigation;
pub mod processor;
pub mod thread;

pub use api::{AuthorView, PostView, RawThreadNode};
pub use error::{Error, Result};
pub use navigation::{ThreadNavigator, ThreadPosition, TreeNode};
pub use processor::{normalize, ThreadProcessor, ThreadSource, DEFAULT_FETCH_DEPTH};
pub use thread::Thread;
