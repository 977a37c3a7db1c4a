use std::collections::BTreeMap;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::InsertError;
use crate::{Config, RadixTree};

/// Owned counterpart of [`Match`](crate::Match), detached from the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedMatch<T> {
    pub value: T,
    /// (name, bound text) in path order.
    pub params: Vec<(String, String)>,
}

impl<T> OwnedMatch<T> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A [`RadixTree`] behind a read-write lock.
///
/// Reads take a shared lock and clone payloads out; writes take the exclusive
/// lock. Use [`read`](Self::read) to borrow from the tree directly.
pub struct SharedTree<T> {
    inner: RwLock<RadixTree<T>>,
}

impl<T: Clone> SharedTree<T> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            inner: RwLock::new(RadixTree::with_config(config)),
        }
    }

    pub fn insert(&self, path: &str, value: T) -> Result<Option<T>, InsertError> {
        self.inner.write().insert(path, value)
    }

    pub fn lookup(&self, path: &str) -> Option<T> {
        self.inner.read().lookup(path).cloned()
    }

    pub fn match_path(&self, path: &str) -> Option<OwnedMatch<T>> {
        let inner = self.inner.read();
        let m = inner.match_path(path)?;
        Some(OwnedMatch {
            value: m.value.clone(),
            params: m
                .params()
                .map(|(name, text)| (name.to_owned(), text.to_owned()))
                .collect(),
        })
    }

    pub fn remove(&self, path: &str) -> Option<T> {
        self.inner.write().remove(path)
    }

    pub fn starts_with(&self, prefix: &str) -> BTreeMap<String, T> {
        self.inner
            .read()
            .starts_with(prefix)
            .into_iter()
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }

    pub fn compact(&self) -> usize {
        self.inner.write().compact()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Shared access to the underlying tree.
    pub fn read(&self) -> RwLockReadGuard<'_, RadixTree<T>> {
        self.inner.read()
    }

    pub fn into_inner(self) -> RadixTree<T> {
        self.inner.into_inner()
    }
}

impl<T: Clone> Default for SharedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<RadixTree<T>> for SharedTree<T> {
    fn from(tree: RadixTree<T>) -> Self {
        Self {
            inner: RwLock::new(tree),
        }
    }
}
