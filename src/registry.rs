//! Primitive registry (C5, spec.md §4.5): thread-safe storage for
//! tools, prompts, resources, and resource templates.
//!
//! Single-writer/many-reader: every read takes a snapshot before
//! iterating, so a concurrent insert/remove never surfaces a partially
//! mutated view to a caller mid-iteration. Backed by `indexmap` so
//! lookup by name/uri is O(1) while iteration order still matches
//! insertion order, which the teacher SDK relies on for stable listing
//! order across pages.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::{watch, RwLock};

use crate::types::protocol::{Prompt, Resource, ResourceTemplate, Tool};

/// A primitive that can be stored in a [`Registry`], keyed by its
/// natural wire identifier.
pub trait Keyed {
    /// The value this primitive is looked up by (`name` for tools and
    /// prompts, `uri`/`uriTemplate` for resources and templates).
    fn key(&self) -> &str;
}

impl Keyed for Tool {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Keyed for Prompt {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Keyed for Resource {
    fn key(&self) -> &str {
        &self.uri
    }
}

impl Keyed for ResourceTemplate {
    fn key(&self) -> &str {
        &self.uri_template
    }
}

/// A registry of one primitive kind. Mutation bumps an internal version
/// counter observable via [`Registry::subscribe_changes`], which the
/// server dispatcher watches to decide when to emit a `list_changed`
/// notification — but only for sessions whose negotiated capabilities
/// advertised that notification, a decision this type deliberately
/// knows nothing about.
pub struct Registry<T> {
    items: Arc<RwLock<IndexMap<String, T>>>,
    version: watch::Sender<u64>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            items: Arc::new(RwLock::new(IndexMap::new())),
            version,
        }
    }

    /// A receiver that observes every future mutation's version number.
    /// Does not replay past mutations.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl<T: Keyed + Clone + Send + Sync> Registry<T> {
    /// Insert or replace `item` under its key. Returns the previous
    /// value, if one existed under the same key. Always bumps the
    /// change version, even on a pure replace, since the contents
    /// changed.
    pub async fn insert(&self, item: T) -> Option<T> {
        let key = item.key().to_string();
        let previous = self.items.write().await.insert(key, item);
        self.bump();
        previous
    }

    /// Remove the item keyed by `key`, if present.
    pub async fn remove(&self, key: &str) -> Option<T> {
        let removed = self.items.write().await.shift_remove(key);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    /// Look up a single item by key.
    pub async fn get(&self, key: &str) -> Option<T> {
        self.items.read().await.get(key).cloned()
    }

    /// `true` if `key` is present.
    pub async fn contains(&self, key: &str) -> bool {
        self.items.read().await.contains_key(key)
    }

    /// A snapshot of every item, in insertion order. Taken under a
    /// single read lock so iteration never observes a concurrent
    /// mutation partway through.
    pub async fn snapshot(&self) -> Vec<T> {
        self.items.read().await.values().cloned().collect()
    }

    /// The number of items currently registered.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// `true` if the registry holds no items.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}
