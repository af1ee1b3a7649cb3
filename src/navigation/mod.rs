//! Cursor-based navigation over a normalized thread.
//!
//! [`ThreadNavigator`] keeps two parallel views of the same thread:
//!
//! - an arena-style node map keyed by AT-URI, for O(1) structural lookups
//!   (parent, children, depth), and
//! - a chronological flat list of URIs (shallowest first, oldest first within
//!   a depth), for linear "flip through everything" traversal.
//!
//! Both views are built once and never change; the only mutable state is a
//! single cursor, exposed as a [`tokio::sync::watch`] cell so UI layers can
//! re-render whenever it actually moves.

mod navigator;
mod tree;

pub use navigator::{ThreadNavigator, ThreadPosition};
pub use tree::TreeNode;
