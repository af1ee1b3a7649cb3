//! The normalized thread tree.
//!
//! A [`Thread`] is what the processor produces from a raw API response: the
//! root post plus recursively nested replies, with every unavailable
//! (deleted/blocked) node already filtered out. It is a plain value type;
//! for cursor-based traversal, feed it to
//! [`ThreadNavigator::build`](crate::ThreadNavigator::build).

use crate::api::PostView;

/// A normalized discussion thread: one post and its viewable replies.
///
/// `replies` is `None` both when the source had no reply entries at this
/// level and when every reply entry was an unavailable stand-in; the two
/// cases are deliberately indistinguishable after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    /// The post at this node of the tree.
    pub post: PostView,
    /// Viewable direct replies, each a thread of its own. `None` when there
    /// are none.
    pub replies: Option<Vec<Thread>>,
}

impl Thread {
    /// Create a thread with no replies.
    pub fn new(post: PostView) -> Self {
        Self {
            post,
            replies: None,
        }
    }

    /// The AT-URI of this thread's root post.
    pub fn root_uri(&self) -> &str {
        &self.post.uri
    }

    /// Get the number of direct replies.
    pub fn reply_count(&self) -> usize {
        self.replies.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Check if this thread has any direct replies.
    pub fn has_replies(&self) -> bool {
        self.reply_count() > 0
    }

    /// Count all posts in this thread (the root plus all nested replies).
    pub fn post_count(&self) -> usize {
        self.iter().count()
    }

    /// Get the maximum reply depth of the thread (0 if there are no replies).
    pub fn max_depth(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&Thread, usize)> = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            for reply in node.replies.iter().flatten() {
                stack.push((reply, depth + 1));
            }
        }
        max
    }

    /// Find a post by AT-URI within this thread.
    pub fn find(&self, uri: &str) -> Option<&PostView> {
        self.iter().find(|post| post.uri == uri)
    }

    /// Iterate over all posts in the thread (depth-first traversal).
    pub fn iter(&self) -> ThreadPosts<'_> {
        ThreadPosts { stack: vec![self] }
    }
}

/// Iterator over all posts in a thread (depth-first traversal).
pub struct ThreadPosts<'a> {
    stack: Vec<&'a Thread>,
}

impl<'a> Iterator for ThreadPosts<'a> {
    type Item = &'a PostView;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push replies in reverse order so they're yielded left-to-right
        for reply in node.replies.iter().flatten().rev() {
            self.stack.push(reply);
        }
        Some(&node.post)
    }
}
