//! # radix-route
//!
//! A compressed prefix tree (radix tree) for route-shaped keys.
//!
//! Paths are registered with a payload and later resolved to the payload of the
//! most specific registration. Three kinds of segment are understood:
//! - literal text, matched exactly
//! - `:name`, binding one segment to `name`
//! - `**`, matching everything that remains (including nothing)
//!
//! At every branch point a literal edge beats a placeholder, which beats a
//! wildcard. A dead end further down backtracks to the next alternative.
//!
//! ## Example
//!
//! ```rust
//! use radix_route::RadixTree;
//!
//! let mut tree: RadixTree<u32> = RadixTree::new();
//! tree.insert("chrome", 6).unwrap();
//! tree.insert("chrome/**", 9).unwrap();
//! tree.insert("choot/:id", 8).unwrap();
//!
//! assert_eq!(tree.lookup("chrome"), Some(&6));
//! assert_eq!(tree.lookup("chrome/anything/here"), Some(&9));
//!
//! let m = tree.match_path("choot/cobrowse").unwrap();
//! assert_eq!(*m.value, 8);
//! assert_eq!(m.param("id"), Some("cobrowse"));
//! drop(m);
//!
//! assert_eq!(tree.remove("chrome"), Some(6));
//! assert_eq!(tree.lookup("chrome"), None);
//! ```
//!
//! The tree itself does no locking. [`SharedTree`] wraps it in a read-write
//! lock for the common build-once, read-many deployment.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod error;
mod insert;
mod lookup;
mod node;
mod normalize;
mod prefix;
mod remove;
mod shared;

pub use error::InsertError;
pub use lookup::Match;
pub use normalize::normalize;
pub use shared::{OwnedMatch, SharedTree};

use smallvec::SmallVec;

use node::{NodeArena, NodeId};
use normalize::{tokenize, Chunk};

/// Node ids passed on the way down, root first.
pub(crate) type Trail = SmallVec<[NodeId; 16]>;

/// Configuration for a [`RadixTree`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Restructure the tree as part of every `remove`. When disabled, removals
    /// only clear payloads and [`RadixTree::compact`] reclaims the structure.
    pub compact_on_remove: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compact_on_remove: true,
        }
    }
}

/// A radix tree mapping route patterns to payloads.
#[derive(Clone)]
pub struct RadixTree<T> {
    pub(crate) nodes: NodeArena<T>,
    pub(crate) count: usize,
    pub(crate) config: Config,
}

impl<T> RadixTree<T> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            nodes: NodeArena::new(),
            count: 0,
            config,
        }
    }

    /// Number of registered paths.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Payload registered under exactly this path.
    ///
    /// Unlike [`lookup`](Self::lookup), placeholders and wildcards are compared
    /// as written: `get("user/:id")` finds the `user/:id` registration, not a
    /// route that would match the text `:id`.
    pub fn get(&self, path: &str) -> Option<&T> {
        let path = normalize(path);
        let chunks = tokenize(&path).ok()?;
        let mut trail = Trail::new();
        let id = self.locate(&chunks, &mut trail)?;
        self.nodes[id].value.as_ref()
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Every registration as `(canonical path, payload)`, depth first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::starting_at(self, NodeId::ROOT, String::new())
    }

    /// Follow `chunks` exactly, pushing every node passed onto `trail`.
    pub(crate) fn locate(&self, chunks: &[Chunk<'_>], trail: &mut Trail) -> Option<NodeId> {
        let mut cur = NodeId::ROOT;
        trail.push(cur);
        for chunk in chunks {
            cur = match *chunk {
                Chunk::Literal(text) => self.find_literal(cur, text, trail)?,
                Chunk::Separator => self.find_literal(cur, "/", trail)?,
                Chunk::Placeholder(name) => {
                    let id = self.nodes[cur]
                        .placeholder
                        .filter(|&id| self.nodes[id].param_name() == Some(name))?;
                    trail.push(id);
                    id
                }
                Chunk::Wildcard => {
                    let id = self.nodes[cur].wildcard?;
                    trail.push(id);
                    id
                }
            };
        }
        Some(cur)
    }

    /// Consume `text` along static edges that it covers exactly.
    pub(crate) fn find_literal(
        &self,
        from: NodeId,
        text: &str,
        trail: &mut Trail,
    ) -> Option<NodeId> {
        let mut cur = from;
        let mut rest = text;
        while let Some(first) = rest.chars().next() {
            let child = self.nodes[cur].static_child(first)?;
            rest = rest.strip_prefix(self.nodes[child].label.as_str())?;
            trail.push(child);
            cur = child;
        }
        Some(cur)
    }
}

impl<T> Default for RadixTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RadixTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Depth-first iterator over registrations.
pub struct Iter<'a, T> {
    tree: &'a RadixTree<T>,
    /// (node, length of the parent's path in `path`)
    stack: Vec<(NodeId, usize)>,
    path: String,
}

impl<'a, T> Iter<'a, T> {
    /// Walk the subtree rooted at `id`, whose parent's full path is `parent_path`.
    pub(crate) fn starting_at(tree: &'a RadixTree<T>, id: NodeId, parent_path: String) -> Self {
        Self {
            tree,
            stack: vec![(id, parent_path.len())],
            path: parent_path,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (String, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, base)) = self.stack.pop() {
            let node = &self.tree.nodes[id];
            self.path.truncate(base);
            self.path.push_str(&node.label);

            let len = self.path.len();
            self.stack.extend(node.children().map(|child| (child, len)));

            if let Some(value) = node.value.as_ref() {
                return Some((self.path.clone(), value));
            }
        }
        None
    }
}



#[cfg(test)]
mod proptests;
