// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Per-scope memo of resolved type names.

use std::collections::HashMap;

use ecow::EcoString;

use super::ty::Ty;

/// How a cached name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey<'a> {
    /// The static view of the class.
    Static,
    /// An instantiation with these generic arguments.
    Args(&'a [Ty]),
}

/// A trie keyed by dotted-name segments, then by generic arguments.
///
/// `java.util.List<int>` is stored under `java` → `util` → `List`, in the
/// instantiation table of that node under `[int]`.
#[derive(Debug, Clone)]
pub struct ResolutionCache<V> {
    root: CacheNode<V>,
}

#[derive(Debug, Clone)]
struct CacheNode<V> {
    static_value: Option<V>,
    instantiations: HashMap<Vec<Ty>, V>,
    children: HashMap<EcoString, CacheNode<V>>,
}

impl<V> Default for CacheNode<V> {
    fn default() -> Self {
        Self {
            static_value: None,
            instantiations: HashMap::new(),
            children: HashMap::new(),
        }
    }
}

impl<V> Default for ResolutionCache<V> {
    fn default() -> Self {
        Self {
            root: CacheNode::default(),
        }
    }
}

impl<V: Clone> ResolutionCache<V> {
    #[must_use]
    pub fn get(&self, name: &str, key: CacheKey<'_>) -> Option<V> {
        let mut node = &self.root;
        for segment in name.split('.') {
            node = node.children.get(segment)?;
        }
        match key {
            CacheKey::Static => node.static_value.clone(),
            CacheKey::Args(args) => node.instantiations.get(args).cloned(),
        }
    }

    pub fn insert(&mut self, name: &str, key: CacheKey<'_>, value: V) {
        let mut node = &mut self.root;
        for segment in name.split('.') {
            node = node.children.entry(segment.into()).or_default();
        }
        match key {
            CacheKey::Static => node.static_value = Some(value),
            CacheKey::Args(args) => {
                node.instantiations.insert(args.to_vec(), value);
            }
        }
    }
}
