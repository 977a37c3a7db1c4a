use tracing::{debug, trace};

use crate::error::InsertError;
use crate::node::{Node, NodeId, NodeKind};
use crate::normalize::{normalize, tokenize, Chunk, WILDCARD};
use crate::{RadixTree, Trail};

impl<T> RadixTree<T> {
    /// Register `path` with `value`.
    ///
    /// Inserting a path whose canonical form is already registered replaces
    /// the payload and returns the old one. Malformed placeholders or
    /// wildcards are rejected without modifying the tree.
    pub fn insert(&mut self, path: &str, value: T) -> Result<Option<T>, InsertError> {
        let path = normalize(path);
        let chunks = tokenize(&path)
            .and_then(|chunks| self.check_conflicts(&chunks).map(|()| chunks))
            .map_err(|err| {
                debug!(path = %path, %err, "rejected insert");
                err
            })?;

        let mut cur = NodeId::ROOT;
        for chunk in &chunks {
            cur = match *chunk {
                Chunk::Literal(text) => self.descend_literal(cur, text),
                Chunk::Separator => self.descend_literal(cur, "/"),
                Chunk::Placeholder(name) => self.descend_placeholder(cur, name),
                Chunk::Wildcard => self.descend_wildcard(cur),
            };
        }

        let old = self.nodes[cur].value.replace(value);
        if old.is_none() {
            self.count += 1;
        } else {
            trace!(path = %path, "replaced payload");
        }
        Ok(old)
    }

    /// Walk the existing tree along `chunks` without modifying it, failing if
    /// a placeholder would land next to one with a different name.
    fn check_conflicts(&self, chunks: &[Chunk<'_>]) -> Result<(), InsertError> {
        let mut scratch = Trail::new();
        let mut cur = NodeId::ROOT;
        for chunk in chunks {
            let next = match *chunk {
                Chunk::Literal(text) => self.find_literal(cur, text, &mut scratch),
                Chunk::Separator => self.find_literal(cur, "/", &mut scratch),
                Chunk::Placeholder(name) => match self.nodes[cur].placeholder {
                    Some(id) => {
                        let existing = self.nodes[id].param_name().unwrap_or_default();
                        // An empty placeholder subtree is renamed instead.
                        if existing != name && self.subtree_has_value(id) {
                            return Err(InsertError::PlaceholderConflict {
                                existing: existing.to_owned(),
                                new: name.to_owned(),
                            });
                        }
                        Some(id)
                    }
                    None => None,
                },
                Chunk::Wildcard => self.nodes[cur].wildcard,
            };
            // Past this point the insert only creates fresh nodes.
            let Some(next) = next else {
                return Ok(());
            };
            cur = next;
        }
        Ok(())
    }

    /// Consume `text` below `from`, splitting and attaching static edges as
    /// needed. Returns the node that ends exactly at the end of `text`.
    fn descend_literal(&mut self, from: NodeId, text: &str) -> NodeId {
        let mut cur = from;
        let mut rest = text;
        loop {
            let Some(first) = rest.chars().next() else {
                return cur;
            };
            let Some(child) = self.nodes[cur].static_child(first) else {
                let leaf = self
                    .nodes
                    .alloc(Node::new(NodeKind::Static, rest.to_owned()));
                self.nodes[cur].statics.push((first, leaf));
                trace!(label = rest, "attached leaf");
                return leaf;
            };

            let common = common_prefix_len(&self.nodes[child].label, rest);
            if common < self.nodes[child].label.len() {
                self.split(child, common);
            }
            rest = &rest[common..];
            cur = child;
        }
    }

    /// Cut the label of `id` at byte `at`. The node keeps the prefix and a new
    /// child takes over the suffix along with everything hanging off `id`.
    fn split(&mut self, id: NodeId, at: usize) {
        let node = &mut self.nodes[id];
        let suffix = node.label.split_off(at);
        let Some(first) = suffix.chars().next() else {
            return;
        };
        trace!(prefix = %node.label, suffix = %suffix, "split edge");

        let tail = Node {
            label: suffix,
            kind: node.kind,
            statics: std::mem::take(&mut node.statics),
            placeholder: node.placeholder.take(),
            wildcard: node.wildcard.take(),
            value: node.value.take(),
        };
        let tail = self.nodes.alloc(tail);
        self.nodes[id].statics.push((first, tail));
    }

    fn descend_placeholder(&mut self, from: NodeId, name: &str) -> NodeId {
        if let Some(id) = self.nodes[from].placeholder {
            if self.nodes[id].param_name() != Some(name) {
                trace!(name, "renamed vacant placeholder");
                self.nodes[id].label = format!(":{name}");
            }
            return id;
        }
        let label = format!(":{name}");
        trace!(label = %label, "attached placeholder");
        let id = self.nodes.alloc(Node::new(NodeKind::Placeholder, label));
        self.nodes[from].placeholder = Some(id);
        id
    }

    fn descend_wildcard(&mut self, from: NodeId) -> NodeId {
        if let Some(id) = self.nodes[from].wildcard {
            return id;
        }
        trace!("attached wildcard");
        let id = self
            .nodes
            .alloc(Node::new(NodeKind::Wildcard, WILDCARD.to_owned()));
        self.nodes[from].wildcard = Some(id);
        id
    }

    fn subtree_has_value(&self, id: NodeId) -> bool {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.value.is_some() {
                return true;
            }
            stack.extend(node.children());
        }
        false
    }
}

/// Length in bytes of the longest common prefix, on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}
