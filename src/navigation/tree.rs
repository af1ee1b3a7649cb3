//! Tree construction: from a nested [`Thread`] to the flat node arena.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;

use crate::api::PostView;
use crate::thread::Thread;

/// One node of the navigator's tree, linked by URI rather than by pointer.
///
/// The node map is the single source of truth for structure: `parent_uri`
/// and `child_uris` are keys back into it, never references, so the tree
/// stays a plain arena with no cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// AT-URI of the post at this node.
    pub uri: String,
    /// URI of the parent node; `None` only for the root.
    pub parent_uri: Option<String>,
    /// URIs of direct replies, ascending by `indexed_at` (ties keep the
    /// order the source delivered them in).
    pub child_uris: Vec<String>,
    /// Distance from the root; the root is 0.
    pub depth: usize,
    /// Parsed index timestamp used for all chronological ordering.
    pub indexed_at: DateTime<Utc>,
}

impl TreeNode {
    /// Check whether this node is the thread root.
    pub fn is_root(&self) -> bool {
        self.parent_uri.is_none()
    }

    /// Get the number of direct replies.
    pub fn reply_count(&self) -> usize {
        self.child_uris.len()
    }
}

/// Everything `ThreadNavigator::build` derives from one thread snapshot.
pub(crate) struct BuiltTree {
    pub root_uri: String,
    pub nodes: HashMap<String, TreeNode>,
    pub posts: HashMap<String, PostView>,
    pub chronological: Vec<String>,
}

/// Parse an `indexed_at` timestamp, falling back to the UNIX epoch.
///
/// Malformed timestamps are tolerated rather than rejected: the post still
/// appears in the tree, sorted before everything well-formed at its depth.
fn parse_indexed_at(uri: &str, raw: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(_) => {
            debug!("unparseable indexedAt {raw:?} on {uri}, sorting as epoch");
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

/// Walk the thread once and build the node map, post map, and chronological
/// list.
///
/// Uses an explicit stack instead of recursion so arbitrarily deep reply
/// chains cannot overflow the stack. Duplicate URIs in malformed input are
/// skipped entirely (first write wins); the maps and the chronological list
/// always hold exactly the same set of URIs.
pub(crate) fn build_tree(thread: Thread) -> BuiltTree {
    let capacity = thread.post_count();
    let root_uri = thread.post.uri.clone();

    let mut nodes: HashMap<String, TreeNode> = HashMap::with_capacity(capacity);
    let mut posts: HashMap<String, PostView> = HashMap::with_capacity(capacity);
    // Walk order, kept so the chronological sort can break ties by it
    let mut order: Vec<String> = Vec::with_capacity(capacity);

    let root_ts = parse_indexed_at(&thread.post.uri, &thread.post.indexed_at);
    let mut stack: Vec<(Thread, Option<String>, usize, DateTime<Utc>)> =
        vec![(thread, None, 0, root_ts)];

    while let Some((node, parent_uri, depth, indexed_at)) = stack.pop() {
        let Thread { post, replies } = node;
        let uri = post.uri.clone();

        if nodes.contains_key(&uri) {
            continue;
        }

        if let Some(parent_uri) = &parent_uri {
            if let Some(parent) = nodes.get_mut(parent_uri) {
                parent.child_uris.push(uri.clone());
            }
        }

        nodes.insert(
            uri.clone(),
            TreeNode {
                uri: uri.clone(),
                parent_uri,
                child_uris: Vec::new(),
                depth,
                indexed_at,
            },
        );
        posts.insert(uri.clone(), post);
        order.push(uri.clone());

        if let Some(replies) = replies {
            // Siblings ascend by indexed_at; the sort is stable, so equal
            // timestamps keep source order
            let mut keyed: Vec<(DateTime<Utc>, Thread)> = replies
                .into_iter()
                .map(|reply| {
                    let ts = parse_indexed_at(&reply.post.uri, &reply.post.indexed_at);
                    (ts, reply)
                })
                .collect();
            keyed.sort_by_key(|(ts, _)| *ts);

            // Reverse push so the stack pops children oldest-first
            for (ts, reply) in keyed.into_iter().rev() {
                stack.push((reply, Some(uri.clone()), depth + 1, ts));
            }
        }
    }

    // Depth first, then time: a breadth-like "discussion order" flattening,
    // intentionally different from the depth-first walk above
    let mut chronological = order;
    chronological.sort_by(|a, b| {
        let a = &nodes[a];
        let b = &nodes[b];
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.indexed_at.cmp(&b.indexed_at))
    });

    debug!(
        "built thread tree for {root_uri}: {} nodes, max depth {}",
        nodes.len(),
        nodes.values().map(|n| n.depth).max().unwrap_or(0)
    );

    BuiltTree {
        root_uri,
        nodes,
        posts,
        chronological,
    }
}
