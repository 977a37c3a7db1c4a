//! Removal and compaction.
//!
//! After a payload is cleared the tree is restored to its minimal shape:
//! - a payload-less, childless node (other than the root) is unlinked
//! - a payload-less literal node with a single literal child absorbs that
//!   child, concatenating the two labels
//!
//! Separator, placeholder and wildcard nodes are never merged, so segment
//! boundaries always stay node boundaries.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::node::NodeId;
use crate::normalize::{normalize, tokenize};
use crate::{RadixTree, Trail};

impl<T> RadixTree<T> {
    /// Remove the registration for exactly `path`, returning its payload.
    ///
    /// Placeholders and wildcards are compared as written, as in
    /// [`get`](Self::get). Removing a path that is not registered does nothing.
    pub fn remove(&mut self, path: &str) -> Option<T> {
        let path = normalize(path);
        let chunks = tokenize(&path).ok()?;
        let mut trail = Trail::new();
        let target = self.locate(&chunks, &mut trail)?;

        let old = self.nodes[target].value.take()?;
        self.count -= 1;
        trace!(path = %path, "removed payload");

        if self.config.compact_on_remove {
            self.compact_trail(trail);
        }
        Some(old)
    }

    /// Rebuild the minimal shape of the whole tree, returning the number of
    /// nodes reclaimed.
    ///
    /// Only needed when `compact_on_remove` is disabled; otherwise the tree is
    /// already minimal and this returns 0.
    pub fn compact(&mut self) -> usize {
        let before = self.nodes.live();
        self.compact_subtree(NodeId::ROOT);
        let reclaimed = before - self.nodes.live();
        debug!(reclaimed, "compacted tree");
        reclaimed
    }

    /// Unwind a descent innermost first. `trail` runs from the root to the
    /// node whose payload was just cleared.
    fn compact_trail(&mut self, mut trail: Trail) {
        let Some(mut cur) = trail.pop() else {
            return;
        };
        while let Some(parent) = trail.pop() {
            if !self.is_vacant(cur) {
                self.try_merge(cur);
                return;
            }
            self.nodes[parent].detach(cur);
            let node = self.nodes.release(cur);
            trace!(label = %node.label, "unlinked empty node");
            cur = parent;
        }
    }

    /// Post-order pass over the subtree at `id`: vacant children are unlinked
    /// once their own subtrees are done, then the node itself may merge.
    fn compact_subtree(&mut self, id: NodeId) {
        let mut stack = vec![(id, false)];
        while let Some((id, visited)) = stack.pop() {
            if !visited {
                stack.push((id, true));
                stack.extend(self.nodes[id].children().map(|child| (child, false)));
                continue;
            }

            let vacant: SmallVec<[NodeId; 8]> = self.nodes[id]
                .children()
                .filter(|&child| self.is_vacant(child))
                .collect();
            for child in vacant {
                self.nodes[id].detach(child);
                self.nodes.release(child);
            }
            self.try_merge(id);
        }
    }

    /// No payload and nothing below it.
    fn is_vacant(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        node.value.is_none() && node.child_count() == 0
    }

    /// Splice out a payload-less literal node with exactly one literal child.
    fn try_merge(&mut self, id: NodeId) {
        if id == NodeId::ROOT {
            return;
        }
        let node = &self.nodes[id];
        if node.value.is_some() || node.is_boundary() || node.child_count() != 1 {
            return;
        }
        let Some(&(_, child)) = node.statics.first() else {
            return;
        };
        if self.nodes[child].is_boundary() {
            return;
        }

        let absorbed = self.nodes.release(child);
        let node = &mut self.nodes[id];
        node.label.push_str(&absorbed.label);
        node.statics = absorbed.statics;
        node.placeholder = absorbed.placeholder;
        node.wildcard = absorbed.wildcard;
        node.value = absorbed.value;
        trace!(label = %node.label, "merged single child");
    }
}
