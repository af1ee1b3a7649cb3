//! Raw wire types for the `app.bsky.feed.getPostThread` response shape.
//!
//! The AT Protocol returns threads as a tagged union: each node in the reply
//! tree is either a viewable post (with optional nested replies of the same
//! union), or a stand-in for a post that cannot be shown (deleted or blocked).
//! Discrimination is by the `$type` string.
//!
//! These types are deliberately shallow: everything a post carries beyond its
//! `uri` and `indexed_at` is opaque to this library and passed through
//! untouched for the caller to render.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The author of a post, as embedded in a post view.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    /// Decentralized identifier of the account.
    pub did: String,
    /// Handle of the account (e.g. `alice.bsky.social`).
    pub handle: String,
    /// Display name, if the account has set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Avatar URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A single viewable post.
///
/// `uri` is the post's unique AT-URI (`at://<did>/<collection>/<rkey>`),
/// treated everywhere in this crate as an opaque key; its internal structure
/// is never parsed. `indexed_at` is the ISO-8601 timestamp the network
/// indexed the post at, and is what all chronological ordering is based on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    /// Unique AT-URI of the post.
    pub uri: String,
    /// Content hash of the post record.
    pub cid: String,
    /// The post's author.
    pub author: AuthorView,
    /// The underlying record (text, embeds, facets). Opaque to this library.
    #[serde(default)]
    pub record: Value,
    /// ISO-8601 timestamp at which the network indexed this post.
    pub indexed_at: String,
    /// Number of direct replies known to the network, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    /// Number of reposts, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repost_count: Option<u64>,
    /// Number of likes, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
}

impl PostView {
    /// Get the post text from the underlying record, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.record.get("text").and_then(Value::as_str)
    }
}

/// One node of a raw thread response: a tagged union over the
/// `app.bsky.feed.defs` thread variants.
///
/// Only [`RawThreadNode::ThreadViewPost`] carries a post; the other variants
/// stand in for posts the viewer cannot see and are filtered out during
/// normalization. Unrecognized `$type` tags decode as
/// [`RawThreadNode::Unknown`] rather than failing the whole response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "$type")]
pub enum RawThreadNode {
    /// A viewable post together with its (possibly absent) nested replies.
    #[serde(rename = "app.bsky.feed.defs#threadViewPost")]
    ThreadViewPost {
        /// The post at this node.
        post: PostView,
        /// Nested replies, each again a thread variant. Absent when the
        /// server did not expand this level.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replies: Option<Vec<RawThreadNode>>,
    },

    /// A post that was deleted or never existed.
    #[serde(rename = "app.bsky.feed.defs#notFoundPost", rename_all = "camelCase")]
    NotFoundPost {
        /// AT-URI the stand-in refers to.
        uri: String,
        /// Always true on the wire; kept for round-tripping.
        #[serde(default)]
        not_found: bool,
    },

    /// A post hidden from the viewer by a block.
    #[serde(rename = "app.bsky.feed.defs#blockedPost", rename_all = "camelCase")]
    BlockedPost {
        /// AT-URI the stand-in refers to.
        uri: String,
        /// Always true on the wire; kept for round-tripping.
        #[serde(default)]
        blocked: bool,
    },

    /// Any variant this library does not recognize.
    #[serde(other)]
    Unknown,
}

impl RawThreadNode {
    /// Construct a thread view node with no replies.
    pub fn post(post: PostView) -> Self {
        RawThreadNode::ThreadViewPost {
            post,
            replies: None,
        }
    }

    /// Construct a thread view node with the given replies.
    pub fn post_with_replies(post: PostView, replies: Vec<RawThreadNode>) -> Self {
        RawThreadNode::ThreadViewPost {
            post,
            replies: Some(replies),
        }
    }

    /// Check whether this node is a viewable post.
    pub fn is_post(&self) -> bool {
        matches!(self, RawThreadNode::ThreadViewPost { .. })
    }
}
