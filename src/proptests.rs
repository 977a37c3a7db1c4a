use super::*;

use crate::node::{NodeId, NodeKind};
use crate::normalize::{normalize, tokenize, Chunk};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

fn validate_tree<V>(t: &RadixTree<V>, minimal: bool) {
    let mut stack = vec![NodeId::ROOT];
    let mut reachable = 0usize;
    let mut values = 0usize;

    while let Some(id) = stack.pop() {
        reachable += 1;
        let node = &t.nodes[id];
        if node.value.is_some() {
            values += 1;
        }

        for (i, &(key, child)) in node.statics.iter().enumerate() {
            let c = &t.nodes[child];
            assert_eq!(c.kind, NodeKind::Static);
            assert_eq!(
                c.label.chars().next(),
                Some(key),
                "static key must be the label's first char"
            );
            assert!(
                c.label == "/" || !c.label.contains('/'),
                "separator inside literal label {:?}",
                c.label
            );
            for &(other, _) in &node.statics[i + 1..] {
                assert_ne!(key, other, "static siblings share a prefix");
            }
        }

        if node.placeholder.is_some() || node.wildcard.is_some() {
            assert!(
                id == NodeId::ROOT || node.label == "/",
                "special child below mid-segment node {:?}",
                node.label
            );
        }
        if let Some(ph) = node.placeholder {
            let c = &t.nodes[ph];
            assert_eq!(c.kind, NodeKind::Placeholder);
            assert!(c.param_name().is_some_and(|n| !n.is_empty()));
        }
        if let Some(wc) = node.wildcard {
            let c = &t.nodes[wc];
            assert_eq!(c.kind, NodeKind::Wildcard);
            assert_eq!(c.label, "**");
            assert_eq!(c.child_count(), 0, "wildcard must be terminal");
        }

        if minimal && id != NodeId::ROOT {
            assert!(
                node.value.is_some() || node.child_count() > 0,
                "vacant node {:?} left behind",
                node.label
            );
            let mergeable = node.value.is_none()
                && !node.is_boundary()
                && node.child_count() == 1
                && node
                    .statics
                    .first()
                    .is_some_and(|&(_, c)| !t.nodes[c].is_boundary());
            assert!(!mergeable, "node {:?} should have been merged", node.label);
        }

        stack.extend(node.children());
    }

    assert_eq!(values, t.len(), "payload count must match RadixTree::len");
    assert_eq!(reachable, t.nodes.live(), "arena holds unreachable nodes");
}

/// Full path of every node, with its kind and payload. Independent of the
/// order children were attached in.
fn shape<V: Clone>(t: &RadixTree<V>) -> BTreeMap<String, (NodeKind, Option<V>)> {
    let mut out = BTreeMap::new();
    let mut stack = vec![(NodeId::ROOT, String::new())];
    while let Some((id, mut path)) = stack.pop() {
        let node = &t.nodes[id];
        path.push_str(&node.label);
        for child in node.children() {
            stack.push((child, path.clone()));
        }
        out.insert(path, (node.kind, node.value.clone()));
    }
    out
}

fn build<V: Clone>(entries: &BTreeMap<String, V>) -> RadixTree<V> {
    let mut t = RadixTree::new();
    for (k, v) in entries {
        t.insert(k, v.clone()).unwrap();
    }
    t
}

/// Per-segment specificity of `chunks` against `text`: 0 literal,
/// 1 placeholder, 2 wildcard. `None` if the pattern does not match.
fn specificity(chunks: &[Chunk<'_>], text: &str) -> Option<Vec<u8>> {
    let mut ranks = Vec::new();
    let mut rest = text;
    for chunk in chunks {
        match *chunk {
            Chunk::Literal(s) => {
                rest = rest.strip_prefix(s)?;
                ranks.push(0);
            }
            Chunk::Separator => rest = rest.strip_prefix('/')?,
            Chunk::Placeholder(_) => {
                let end = rest.find('/').unwrap_or(rest.len());
                if end == 0 {
                    return None;
                }
                rest = &rest[end..];
                ranks.push(1);
            }
            Chunk::Wildcard => {
                ranks.push(2);
                return Some(ranks);
            }
        }
    }
    rest.is_empty().then_some(ranks)
}

/// Brute-force resolution: the matching pattern with the most specific
/// segments, compared left to right.
fn reference_lookup<V: Copy>(patterns: &BTreeMap<String, V>, path: &str) -> Option<V> {
    let path = normalize(path);
    patterns
        .iter()
        .filter_map(|(pattern, v)| {
            let chunks = tokenize(pattern).ok()?;
            specificity(&chunks, &path).map(|rank| (rank, *v))
        })
        .min_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, v)| v)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(
        #[proptest(regex = "/{0,2}([ab]{1,2}|\\*|:[xy]|\\*\\*)?(/{1,2}([ab]{1,2}|\\*|:[xy]|\\*\\*)){0,3}/?")]
        String,
        u8,
    ),
    #[proptest(weight = 3)]
    Remove(
        #[proptest(regex = "/{0,2}([ab]{1,2}|\\*|:[xy]|\\*\\*)?(/{1,2}([ab]{1,2}|\\*|:[xy]|\\*\\*)){0,3}/?")]
        String,
    ),
    #[proptest(weight = 3)]
    Lookup(#[proptest(regex = "/{0,2}[ab*:x]{0,2}(/{1,2}[ab*:x]{0,3}){0,3}/?")] String),
    #[proptest(weight = 1)]
    Compact,
}

fn run_ops(config: Config, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let eager = config.compact_on_remove;
    let mut t: RadixTree<u8> = RadixTree::with_config(config);
    let mut m: BTreeMap<String, u8> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(path, value) => {
                let key = normalize(&path).into_owned();
                match t.insert(&path, value) {
                    Ok(old) => prop_assert_eq!(old, m.insert(key, value)),
                    Err(_) => prop_assert!(tokenize(&key).is_err() || !m.contains_key(&key)),
                }
            }
            Op::Remove(path) => {
                let key = normalize(&path).into_owned();
                prop_assert_eq!(t.remove(&path), m.remove(&key));
                prop_assert!(t.get(&path).is_none());
            }
            Op::Lookup(path) => {
                prop_assert_eq!(t.lookup(&path).copied(), reference_lookup(&m, &path));
            }
            Op::Compact => {
                let reclaimed = t.compact();
                if eager {
                    prop_assert_eq!(reclaimed, 0);
                }
            }
        }
        prop_assert_eq!(t.len(), m.len());
    }

    validate_tree(&t, eager);
    for (k, v) in &m {
        prop_assert_eq!(t.get(k), Some(v));
    }
    let got: BTreeMap<String, u8> = t.iter().map(|(k, v)| (k, *v)).collect();
    prop_assert_eq!(&got, &m);

    t.compact();
    validate_tree(&t, true);
    prop_assert_eq!(shape(&t), shape(&build(&m)));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_eager(ops in prop::collection::vec(any::<Op>(), 0..=300)) {
        run_ops(Config::default(), ops)?;
    }

    #[test]
    fn prop_equivalence_deferred(ops in prop::collection::vec(any::<Op>(), 0..=300)) {
        run_ops(Config { compact_on_remove: false }, ops)?;
    }

    #[test]
    fn prop_normalize_idempotent(p in "[ab/]{0,16}") {
        let once = normalize(&p).into_owned();
        prop_assert_eq!(normalize(&once), once.as_str());
        prop_assert!(!once.starts_with('/'));
        prop_assert!(!once.contains("//"));
    }

    #[test]
    fn prop_equivalent_spellings_resolve_alike(p in "[ab/]{0,12}", v in any::<u8>()) {
        let mut t: RadixTree<u8> = RadixTree::new();
        t.insert(&p, v).unwrap();
        let canonical = normalize(&p).into_owned();
        let respelled = format!("//{}", canonical.replace('/', "//"));
        prop_assert_eq!(t.lookup(&respelled), t.lookup(&p));
        prop_assert_eq!(t.lookup(&canonical), Some(&v));
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const SMALL_SET: [&str; 6] = ["a", "ab", "a/:x", "a/b", "abc/**", "b"];

#[test]
fn exhaustive_insert_order_small_set() {
    let expected: BTreeMap<String, u64> = SMALL_SET
        .iter()
        .enumerate()
        .map(|(i, k)| (k.to_string(), i as u64))
        .collect();
    let expected_shape = shape(&build(&expected));

    for_each_permutation(&SMALL_SET, |perm| {
        let mut t: RadixTree<u64> = RadixTree::new();
        for k in perm {
            t.insert(k, expected[k]).unwrap();
        }

        validate_tree(&t, true);
        assert_eq!(shape(&t), expected_shape);
        for (k, v) in &expected {
            assert_eq!(t.lookup(k), Some(v), "{k}");
        }
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let mut base: RadixTree<u64> = RadixTree::new();
    let mut remaining: BTreeMap<String, u64> = BTreeMap::new();
    for (i, k) in SMALL_SET.iter().enumerate() {
        base.insert(k, i as u64).unwrap();
        remaining.insert(k.to_string(), i as u64);
    }

    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = base.clone();
        let mut m = remaining.clone();

        for k in perm {
            assert_eq!(t.remove(k), m.remove(k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t, true);
            assert_eq!(shape(&t), shape(&build(&m)));
        }
        assert!(t.is_empty());
        assert_eq!(t.nodes.live(), 1);
    });
}
