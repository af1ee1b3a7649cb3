//! The navigator itself: immutable tree views plus one reactive cursor.

use std::collections::HashMap;

use log::debug;
use tokio::sync::watch;

use crate::api::PostView;
use crate::thread::Thread;

use super::tree::{build_tree, BuiltTree, TreeNode};

/// Where the cursor sits in the chronological ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadPosition {
    /// Index into the chronological list, or `None` when the cursor is unset.
    pub index: Option<usize>,
    /// Total number of posts in the thread.
    pub total: usize,
    /// Whether the cursor is on the first chronological entry.
    pub is_first: bool,
    /// Whether the cursor is on the last chronological entry.
    pub is_last: bool,
}

/// A cursor over one immutable snapshot of a discussion thread.
///
/// Built once from a normalized [`Thread`]; the tree never changes
/// afterwards. When fresh data arrives (say, a refetch picked up new
/// replies), build a new navigator and pass the old cursor's URI as
/// `initial_cursor_uri` to keep the reader's place; it falls back to the
/// root if that post no longer exists.
///
/// All movement methods return `true` when the cursor moved and `false` when
/// the move was impossible; an impossible move changes nothing and notifies
/// nobody. None of them wrap around: a caller that wants last-to-first
/// looping detects the failed [`move_to_next`](Self::move_to_next) and jumps
/// explicitly with [`move_to`](Self::move_to).
///
/// # Example
///
/// ```
/// use bsky_threads::{normalize, RawThreadNode, ThreadNavigator};
/// use serde_json::json;
///
/// let raw: RawThreadNode = serde_json::from_value(json!({
///     "$type": "app.bsky.feed.defs#threadViewPost",
///     "post": {
///         "uri": "at://did:plc:abc/app.bsky.feed.post/root",
///         "cid": "bafyroot",
///         "author": {"did": "did:plc:abc", "handle": "alice.bsky.social"},
///         "record": {"text": "original post"},
///         "indexedAt": "2024-03-01T10:00:00Z"
///     },
///     "replies": [{
///         "$type": "app.bsky.feed.defs#threadViewPost",
///         "post": {
///             "uri": "at://did:plc:def/app.bsky.feed.post/reply",
///             "cid": "bafyreply",
///             "author": {"did": "did:plc:def", "handle": "bob.bsky.social"},
///             "record": {"text": "a reply"},
///             "indexedAt": "2024-03-01T11:00:00Z"
///         }
///     }]
/// })).unwrap();
///
/// let nav = ThreadNavigator::build(normalize(raw).unwrap(), None);
/// assert_eq!(nav.post_count(), 2);
/// assert!(nav.move_to_first_child());
/// assert_eq!(nav.current_post().unwrap().text(), Some("a reply"));
/// assert!(nav.move_to_parent());
/// assert_eq!(nav.cursor().as_deref(), Some(nav.root_uri()));
/// ```
#[derive(Debug)]
pub struct ThreadNavigator {
    root_uri: String,
    nodes: HashMap<String, TreeNode>,
    posts: HashMap<String, PostView>,
    chronological: Vec<String>,
    cursor: watch::Sender<Option<String>>,
}

impl ThreadNavigator {
    /// Build a navigator from a normalized thread snapshot.
    ///
    /// The initial cursor is `initial_cursor_uri` when that post exists in
    /// the thread, the root otherwise.
    pub fn build(thread: Thread, initial_cursor_uri: Option<&str>) -> Self {
        let BuiltTree {
            root_uri,
            nodes,
            posts,
            chronological,
        } = build_tree(thread);

        let initial = match initial_cursor_uri {
            Some(uri) if nodes.contains_key(uri) => uri.to_string(),
            Some(uri) => {
                debug!("initial cursor {uri} not in thread, falling back to root");
                root_uri.clone()
            }
            None => root_uri.clone(),
        };
        let (cursor, _) = watch::channel(Some(initial));

        Self {
            root_uri,
            nodes,
            posts,
            chronological,
            cursor,
        }
    }

    /// The URI of the thread's root post.
    pub fn root_uri(&self) -> &str {
        &self.root_uri
    }

    /// Total number of posts in the thread.
    pub fn post_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether a post with the given URI exists in the thread.
    pub fn contains(&self, uri: &str) -> bool {
        self.nodes.contains_key(uri)
    }

    /// All post URIs, shallowest depth first, ascending `indexed_at` within
    /// a depth.
    pub fn chronological_uris(&self) -> &[String] {
        &self.chronological
    }

    /// The URI the cursor currently points at.
    pub fn cursor(&self) -> Option<String> {
        self.cursor.borrow().clone()
    }

    /// Subscribe to cursor changes.
    ///
    /// The receiver is notified exactly when a movement method actually
    /// changes the cursor; failed moves (and moves onto the current post)
    /// are silent. The value at subscription time counts as already seen.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.cursor.subscribe()
    }

    /// Look up a tree node by URI.
    pub fn node(&self, uri: &str) -> Option<&TreeNode> {
        self.nodes.get(uri)
    }

    /// Look up a post by URI.
    pub fn post(&self, uri: &str) -> Option<&PostView> {
        self.posts.get(uri)
    }

    /// The tree node under the cursor.
    pub fn current_node(&self) -> Option<&TreeNode> {
        let uri = self.cursor.borrow().clone()?;
        self.nodes.get(&uri)
    }

    /// The post under the cursor.
    pub fn current_post(&self) -> Option<&PostView> {
        let uri = self.cursor.borrow().clone()?;
        self.posts.get(&uri)
    }

    /// Where the cursor sits in the chronological ordering.
    pub fn position(&self) -> ThreadPosition {
        let total = self.chronological.len();
        let index = {
            let cursor = self.cursor.borrow();
            cursor
                .as_deref()
                .and_then(|uri| self.chronological.iter().position(|u| u == uri))
        };

        match index {
            Some(index) => ThreadPosition {
                index: Some(index),
                total,
                is_first: index == 0,
                is_last: index + 1 == total,
            },
            None => ThreadPosition {
                index: None,
                total,
                is_first: false,
                is_last: false,
            },
        }
    }

    /// Move the cursor to the given post. Fails if the URI is not in the
    /// thread.
    pub fn move_to(&self, uri: &str) -> bool {
        if !self.nodes.contains_key(uri) {
            return false;
        }
        self.set_cursor(uri);
        true
    }

    /// Move the cursor to the root post. Always succeeds.
    pub fn move_to_root(&self) -> bool {
        let root = self.root_uri.clone();
        self.set_cursor(&root);
        true
    }

    /// Move the cursor to the current post's parent. Fails at the root.
    pub fn move_to_parent(&self) -> bool {
        let target = match self.current_node().and_then(|n| n.parent_uri.clone()) {
            Some(uri) => uri,
            None => return false,
        };
        self.set_cursor(&target);
        true
    }

    /// Move the cursor to the current post's oldest reply. Fails when there
    /// are no replies.
    pub fn move_to_first_child(&self) -> bool {
        let target = match self.current_node().and_then(|n| n.child_uris.first().cloned()) {
            Some(uri) => uri,
            None => return false,
        };
        self.set_cursor(&target);
        true
    }

    /// Move the cursor to the next sibling (one later in the parent's reply
    /// list). Fails at the root and on the last sibling.
    pub fn move_to_next_sibling(&self) -> bool {
        self.move_sibling(1)
    }

    /// Move the cursor to the previous sibling. Fails at the root and on the
    /// first sibling.
    pub fn move_to_prev_sibling(&self) -> bool {
        self.move_sibling(-1)
    }

    /// Move the cursor one step forward in chronological order.
    ///
    /// Chronological order is depth-blind within the thread, so this can hop
    /// between branches; that is the point of the "flip through everything"
    /// traversal. Fails on the last entry; never wraps.
    pub fn move_to_next(&self) -> bool {
        self.move_chronological(1)
    }

    /// Move the cursor one step back in chronological order. Fails on the
    /// first entry; never wraps.
    pub fn move_to_prev(&self) -> bool {
        self.move_chronological(-1)
    }

    /// Notify watchers only when the value actually changes.
    fn set_cursor(&self, uri: &str) {
        self.cursor.send_if_modified(|current| {
            if current.as_deref() == Some(uri) {
                false
            } else {
                *current = Some(uri.to_string());
                true
            }
        });
    }

    fn move_sibling(&self, offset: isize) -> bool {
        let target = {
            let node = match self.current_node() {
                Some(node) => node,
                None => return false,
            };
            let parent = match node.parent_uri.as_deref().and_then(|p| self.nodes.get(p)) {
                Some(parent) => parent,
                None => return false,
            };
            let index = match parent.child_uris.iter().position(|u| u == &node.uri) {
                Some(index) => index as isize,
                None => return false,
            };
            let target = index + offset;
            if target < 0 || target as usize >= parent.child_uris.len() {
                return false;
            }
            parent.child_uris[target as usize].clone()
        };
        self.set_cursor(&target);
        true
    }

    fn move_chronological(&self, offset: isize) -> bool {
        let target = {
            let cursor = self.cursor.borrow();
            let uri = match cursor.as_deref() {
                Some(uri) => uri,
                None => return false,
            };
            let index = match self.chronological.iter().position(|u| u == uri) {
                Some(index) => index as isize,
                None => return false,
            };
            let target = index + offset;
            if target < 0 || target as usize >= self.chronological.len() {
                return false;
            }
            self.chronological[target as usize].clone()
        };
        self.set_cursor(&target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AuthorView;
    use serde_json::json;

    fn make_post(uri: &str, indexed_at: &str) -> PostView {
        PostView {
            uri: uri.to_string(),
            cid: format!("cid-{uri}"),
            author: AuthorView {
                did: "did:plc:test".to_string(),
                handle: "test.bsky.social".to_string(),
                display_name: None,
                avatar: None,
            },
            record: json!({"text": "test"}),
            indexed_at: indexed_at.to_string(),
            reply_count: None,
            repost_count: None,
            like_count: None,
        }
    }

    fn leaf(uri: &str, indexed_at: &str) -> Thread {
        Thread::new(make_post(uri, indexed_at))
    }

    /// A(T0) with replies B(T2) and C(T1); B has one reply D(T3).
    /// Chronological order must be [A, C, B, D].
    fn abcd_thread() -> Thread {
        Thread {
            post: make_post("at://A", "2024-03-01T10:00:00Z"),
            replies: Some(vec![
                Thread {
                    post: make_post("at://B", "2024-03-01T12:00:00Z"),
                    replies: Some(vec![leaf("at://D", "2024-03-01T13:00:00Z")]),
                },
                leaf("at://C", "2024-03-01T11:00:00Z"),
            ]),
        }
    }

    #[test]
    fn test_build_defaults_cursor_to_root() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        assert_eq!(nav.cursor().as_deref(), Some("at://A"));
        assert_eq!(nav.root_uri(), "at://A");
        assert_eq!(nav.post_count(), 4);
    }

    #[test]
    fn test_initial_cursor_respected_when_present() {
        let nav = ThreadNavigator::build(abcd_thread(), Some("at://C"));
        assert_eq!(nav.cursor().as_deref(), Some("at://C"));
    }

    #[test]
    fn test_initial_cursor_falls_back_to_root() {
        let nav = ThreadNavigator::build(abcd_thread(), Some("at://not-in-thread"));
        assert_eq!(nav.cursor().as_deref(), Some("at://A"));
    }

    #[test]
    fn test_lookups() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        assert!(nav.contains("at://D"));
        assert!(!nav.contains("at://E"));
        assert!(nav.node("at://D").is_some());
        assert!(nav.node("at://E").is_none());
        assert_eq!(nav.post("at://C").map(|p| p.uri.as_str()), Some("at://C"));
        assert_eq!(nav.current_post().map(|p| p.uri.as_str()), Some("at://A"));
    }

    #[test]
    fn test_first_child_is_oldest_reply() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        // A's replies sorted by time: C before B
        assert!(nav.move_to_first_child());
        assert_eq!(nav.cursor().as_deref(), Some("at://C"));
    }

    #[test]
    fn test_sibling_moves() {
        let nav = ThreadNavigator::build(abcd_thread(), Some("at://C"));

        assert!(!nav.move_to_prev_sibling());
        assert_eq!(nav.cursor().as_deref(), Some("at://C"));

        assert!(nav.move_to_next_sibling());
        assert_eq!(nav.cursor().as_deref(), Some("at://B"));

        assert!(!nav.move_to_next_sibling());
        assert_eq!(nav.cursor().as_deref(), Some("at://B"));

        assert!(nav.move_to_prev_sibling());
        assert_eq!(nav.cursor().as_deref(), Some("at://C"));
    }

    #[test]
    fn test_root_has_no_parent_or_siblings() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        assert!(!nav.move_to_parent());
        assert!(!nav.move_to_next_sibling());
        assert!(!nav.move_to_prev_sibling());
        assert_eq!(nav.cursor().as_deref(), Some("at://A"));
    }

    #[test]
    fn test_chronological_moves_hop_between_branches() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        assert_eq!(nav.chronological_uris(), ["at://A", "at://C", "at://B", "at://D"]);

        assert!(nav.move_to_next());
        assert_eq!(nav.cursor().as_deref(), Some("at://C"));
        assert!(nav.move_to_next());
        assert_eq!(nav.cursor().as_deref(), Some("at://B"));
        assert!(nav.move_to_next());
        assert_eq!(nav.cursor().as_deref(), Some("at://D"));

        // No wraparound
        assert!(!nav.move_to_next());
        assert_eq!(nav.cursor().as_deref(), Some("at://D"));

        assert!(nav.move_to_prev());
        assert_eq!(nav.cursor().as_deref(), Some("at://B"));
    }

    #[test]
    fn test_position() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        assert_eq!(
            nav.position(),
            ThreadPosition {
                index: Some(0),
                total: 4,
                is_first: true,
                is_last: false
            }
        );

        nav.move_to("at://D");
        assert_eq!(
            nav.position(),
            ThreadPosition {
                index: Some(3),
                total: 4,
                is_first: false,
                is_last: true
            }
        );
    }

    #[test]
    fn test_move_to_unknown_uri_is_inert() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        assert!(!nav.move_to("at://nope"));
        assert_eq!(nav.cursor().as_deref(), Some("at://A"));
    }

    #[test]
    fn test_move_to_root() {
        let nav = ThreadNavigator::build(abcd_thread(), Some("at://D"));
        assert!(nav.move_to_root());
        assert_eq!(nav.cursor().as_deref(), Some("at://A"));
        // Also succeeds when already there
        assert!(nav.move_to_root());
    }

    #[test]
    fn test_child_parent_round_trip() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        let mut descents = 0;
        while nav.move_to_first_child() {
            descents += 1;
        }
        assert!(descents > 0);
        for _ in 0..descents {
            assert!(nav.move_to_parent());
        }
        assert_eq!(nav.cursor().as_deref(), Some("at://A"));
    }

    #[test]
    fn test_chronological_round_trip() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        let total = nav.position().total;

        for _ in 0..total - 1 {
            assert!(nav.move_to_next());
        }
        assert!(nav.position().is_last);
        assert!(!nav.move_to_next());

        for _ in 0..total - 1 {
            assert!(nav.move_to_prev());
        }
        assert!(nav.position().is_first);
        assert!(!nav.move_to_prev());
    }

    #[test]
    fn test_watch_notifies_only_on_change() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        let mut rx = nav.subscribe();

        // Initial value counts as seen
        assert!(!rx.has_changed().unwrap());

        assert!(nav.move_to("at://C"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("at://C"));

        // Failed move: no notification
        assert!(!nav.move_to("at://nope"));
        assert!(!rx.has_changed().unwrap());

        // Successful move onto the current post: value unchanged, silent
        assert!(nav.move_to("at://C"));
        assert!(!rx.has_changed().unwrap());

        assert!(nav.move_to_next_sibling());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("at://B"));
    }

    #[test]
    fn test_rebuild_preserves_cursor_by_uri() {
        let nav = ThreadNavigator::build(abcd_thread(), None);
        nav.move_to("at://D");

        // Simulate a refetch that grew the thread
        let mut refetched = abcd_thread();
        refetched
            .replies
            .as_mut()
            .unwrap()
            .push(leaf("at://E", "2024-03-01T14:00:00Z"));

        let old_cursor = nav.cursor();
        let rebuilt = ThreadNavigator::build(refetched, old_cursor.as_deref());
        assert_eq!(rebuilt.cursor().as_deref(), Some("at://D"));
        assert_eq!(rebuilt.post_count(), 5);
    }
}
