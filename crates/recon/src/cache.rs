use std::collections::HashMap;

use crate::matcher::{find_match, normalize};
use crate::model::MatchKind;

/// One remote item held for the duration of a pass.
#[derive(Debug, Clone)]
pub struct CachedItem {
    pub id: String,
    pub name: String,
    /// Current value of the relation column under reconciliation
    /// (empty for boards fetched without a column filter).
    pub linked_ids: Vec<String>,
}

/// Full item list of one board, fetched once per run.
///
/// Keeps the remote API's iteration order for the substring pass and an
/// exact-lookup index keyed by normalized name. Duplicate normalized names
/// keep the first occurrence, matching the scripts this replaces.
#[derive(Debug, Default)]
pub struct BoardCache {
    items: Vec<CachedItem>,
    normalized: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl BoardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = CachedItem>) -> Self {
        let mut cache = Self::new();
        for item in items {
            cache.insert(item);
        }
        cache
    }

    pub fn insert(&mut self, item: CachedItem) {
        let key = normalize(&item.name);
        let idx = self.items.len();
        self.by_name.entry(key.clone()).or_insert(idx);
        self.normalized.push(key);
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CachedItem] {
        &self.items
    }

    /// Resolve a local name to a cached item. Exact normalized equality is
    /// checked via the index; the substring fallback scans in remote order.
    pub fn find(&self, query: &str, allow_substring: bool) -> Option<(&CachedItem, MatchKind)> {
        let needle = normalize(query);
        if needle.is_empty() {
            return None;
        }
        if let Some(&idx) = self.by_name.get(&needle) {
            return Some((&self.items[idx], MatchKind::Exact));
        }
        if allow_substring {
            // Exact already failed, so find_match can only return a
            // substring hit here.
            if let Some((idx, kind)) = find_match(query, &self.normalized, true) {
                return Some((&self.items[idx], kind));
            }
        }
        None
    }
}
