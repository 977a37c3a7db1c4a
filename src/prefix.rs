use std::collections::BTreeMap;

use crate::node::NodeId;
use crate::normalize::normalize;
use crate::{Iter, RadixTree};

impl<T> RadixTree<T> {
    /// Every registration whose canonical path begins with `prefix`.
    ///
    /// The prefix is compared as text, so it may stop part-way through an
    /// edge: `starts_with("chro")` finds both `chrome` and `chromium`.
    /// Callers must not rely on any particular key order.
    pub fn starts_with(&self, prefix: &str) -> BTreeMap<String, &T> {
        let prefix = normalize(prefix);
        let mut out = BTreeMap::new();
        if prefix.is_empty() {
            out.extend(self.iter());
            return out;
        }

        // Every node on the stack sits exactly `consumed` bytes into the
        // prefix, so its full path is `prefix[..consumed]`.
        let mut stack = vec![(NodeId::ROOT, 0usize)];
        while let Some((id, consumed)) = stack.pop() {
            let (path, rest) = prefix.split_at(consumed);
            // All children are tried: a literal `*x` and the wildcard `**` can
            // both start with the prefix's next character.
            for child in self.nodes[id].children() {
                let label = self.nodes[child].label.as_str();
                match rest.strip_prefix(label) {
                    Some("") => out.extend(Iter::starting_at(self, child, path.to_owned())),
                    Some(_) => stack.push((child, consumed + label.len())),
                    None if label.starts_with(rest) => {
                        out.extend(Iter::starting_at(self, child, path.to_owned()))
                    }
                    None => {}
                }
            }
        }
        out
    }
}
