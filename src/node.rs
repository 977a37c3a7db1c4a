//! Node storage.
//!
//! Nodes live in a flat arena and refer to their children by index. There are
//! no parent pointers: operations that need to walk back up record the ids they
//! passed on the way down.

use smallvec::SmallVec;

use crate::normalize::PLACEHOLDER_MARKER;

/// Index of a node in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    /// Id of the slot at `index`. Ids are 32 bits, so an arena holds at most
    /// `u32::MAX` nodes.
    fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(raw) if raw != u32::MAX => NodeId(raw),
            _ => panic!("node arena exhausted at {index} slots"),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// Literal text, or a lone `/`.
    Static,
    /// `:name`, binding one segment.
    Placeholder,
    /// `**`, matching all remaining text.
    Wildcard,
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    /// Text consumed on the edge from the parent. Empty for the root.
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    /// Static children keyed by the first character of their label.
    pub(crate) statics: SmallVec<[(char, NodeId); 4]>,
    pub(crate) placeholder: Option<NodeId>,
    pub(crate) wildcard: Option<NodeId>,
    pub(crate) value: Option<T>,
}

impl<T> Node<T> {
    pub(crate) fn new(kind: NodeKind, label: String) -> Self {
        Self {
            label,
            kind,
            statics: SmallVec::new(),
            placeholder: None,
            wildcard: None,
            value: None,
        }
    }

    /// Name bound by a placeholder node.
    pub(crate) fn param_name(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Placeholder => self.label.strip_prefix(PLACEHOLDER_MARKER),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn static_child(&self, first: char) -> Option<NodeId> {
        self.statics
            .iter()
            .find(|(c, _)| *c == first)
            .map(|&(_, id)| id)
    }

    pub(crate) fn child_count(&self) -> usize {
        self.statics.len()
            + usize::from(self.placeholder.is_some())
            + usize::from(self.wildcard.is_some())
    }

    /// Every child id: statics first, then placeholder, then wildcard.
    pub(crate) fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.statics
            .iter()
            .map(|&(_, id)| id)
            .chain(self.placeholder)
            .chain(self.wildcard)
    }

    /// Separator and special-token nodes anchor segment boundaries and are
    /// never merged with a neighbour.
    pub(crate) fn is_boundary(&self) -> bool {
        self.kind != NodeKind::Static || self.label == "/"
    }

    /// Drop the link to `child`, whichever slot holds it.
    pub(crate) fn detach(&mut self, child: NodeId) {
        if self.placeholder == Some(child) {
            self.placeholder = None;
        } else if self.wildcard == Some(child) {
            self.wildcard = None;
        } else {
            self.statics.retain(|(_, id)| *id != child);
        }
    }
}

/// Arena of nodes with a free list for slots released by compaction.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<T> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeId>,
}

impl<T> NodeArena<T> {
    /// A fresh arena holding only the root.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Static, String::new())],
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            return id;
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Release a slot, returning the node that occupied it.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<T> {
        debug_assert_ne!(id, NodeId::ROOT, "root is never released");
        let node = std::mem::replace(
            &mut self.nodes[id.index()],
            Node::new(NodeKind::Static, String::new()),
        );
        self.free.push(id);
        node
    }

    /// Number of live nodes, root included.
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}

impl<T> std::ops::Index<NodeId> for NodeArena<T> {
    type Output = Node<T>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }
}

impl<T> std::ops::IndexMut<NodeId> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }
}
