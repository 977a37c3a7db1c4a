use std::borrow::Cow;
use std::ops::Range;

use smallvec::SmallVec;

use crate::node::NodeId;
use crate::normalize::{normalize, SEPARATOR};
use crate::RadixTree;

/// Placeholder bindings as (name, byte range into the canonical path).
type Bindings<'t> = SmallVec<[(&'t str, Range<usize>); 4]>;

/// Alternative a frame tries next.
#[derive(Clone, Copy)]
enum Next {
    Static,
    Placeholder,
    Wildcard,
}

/// One node on the current descent.
#[derive(Clone, Copy)]
struct Frame {
    id: NodeId,
    /// Byte offset into the canonical path where this node's children start.
    cursor: usize,
    next: Next,
    /// Binding count before this node was entered.
    mark: usize,
}

fn set_next(frames: &mut [Frame], next: Next) {
    if let Some(top) = frames.last_mut() {
        top.next = next;
    }
}

/// Abandon the innermost frame along with any binding it introduced.
fn backtrack(frames: &mut SmallVec<[Frame; 16]>, params: &mut Bindings<'_>) {
    if let Some(frame) = frames.pop() {
        params.truncate(frame.mark);
    }
}

/// A successful match: the payload plus any placeholder bindings.
#[derive(Debug, Clone)]
pub struct Match<'t, 'p, T> {
    pub value: &'t T,
    path: Cow<'p, str>,
    params: Bindings<'t>,
}

impl<'t, 'p, T> Match<'t, 'p, T> {
    /// Text bound to the placeholder `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, range)| &self.path[range.clone()])
    }

    /// All bindings in path order.
    pub fn params(&self) -> impl Iterator<Item = (&'t str, &str)> + '_ {
        self.params
            .iter()
            .map(|(name, range)| (*name, &self.path[range.clone()]))
    }

    /// The canonical form of the path that was matched.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<T> RadixTree<T> {
    /// Payload of the most specific registration matching `path`.
    pub fn lookup(&self, path: &str) -> Option<&T> {
        self.match_path(path).map(|m| m.value)
    }

    /// Like [`lookup`](Self::lookup), also reporting placeholder bindings.
    pub fn match_path<'t, 'p>(&'t self, path: &'p str) -> Option<Match<'t, 'p, T>> {
        let path = normalize(path);
        let mut params = Bindings::new();
        let id = self.descend(&path, &mut params)?;
        let value = self.nodes[id].value.as_ref()?;
        Some(Match {
            value,
            path,
            params,
        })
    }

    /// Resolve `path` from the root, trying static, then placeholder, then
    /// wildcard children at every node and backtracking on failure.
    fn descend<'t>(&'t self, path: &str, params: &mut Bindings<'t>) -> Option<NodeId> {
        let mut frames: SmallVec<[Frame; 16]> = SmallVec::new();
        frames.push(Frame {
            id: NodeId::ROOT,
            cursor: 0,
            next: Next::Static,
            mark: 0,
        });

        while let Some(&Frame {
            id, cursor, next, ..
        }) = frames.last()
        {
            let node = &self.nodes[id];
            let rest = &path[cursor..];

            let Some(first) = rest.chars().next() else {
                if node.value.is_some() {
                    return Some(id);
                }
                // A wildcard may match nothing at all.
                if let Some(w) = self.terminal_wildcard(id) {
                    return Some(w);
                }
                backtrack(&mut frames, params);
                continue;
            };

            match next {
                Next::Static => {
                    set_next(&mut frames, Next::Placeholder);
                    if let Some(child) = node.static_child(first) {
                        let label = self.nodes[child].label.as_str();
                        if rest.starts_with(label) {
                            frames.push(Frame {
                                id: child,
                                cursor: cursor + label.len(),
                                next: Next::Static,
                                mark: params.len(),
                            });
                        }
                    }
                }
                Next::Placeholder => {
                    set_next(&mut frames, Next::Wildcard);
                    let end = rest.find(SEPARATOR).unwrap_or(rest.len());
                    let bound = node
                        .placeholder
                        .filter(|_| end > 0)
                        .and_then(|ph| Some((ph, self.nodes[ph].param_name()?)));
                    if let Some((ph, name)) = bound {
                        let mark = params.len();
                        params.push((name, cursor..cursor + end));
                        frames.push(Frame {
                            id: ph,
                            cursor: cursor + end,
                            next: Next::Static,
                            mark,
                        });
                    }
                }
                Next::Wildcard => {
                    if let Some(w) = self.terminal_wildcard(id) {
                        return Some(w);
                    }
                    backtrack(&mut frames, params);
                }
            }
        }
        None
    }

    #[inline]
    fn terminal_wildcard(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id]
            .wildcard
            .filter(|&w| self.nodes[w].value.is_some())
    }
}
