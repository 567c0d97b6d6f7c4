//! Bidirectional id/name index

use std::collections::HashMap;

use tracing::warn;

/// Bidirectional mapping between controller ids and a human-meaningful key
/// (name, serial number, version string).
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    kind: &'static str,
    by_id: HashMap<String, String>,
    by_key: HashMap<String, String>,
}

impl IdIndex {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            by_id: HashMap::new(),
            by_key: HashMap::new(),
        }
    }

    /// Insert a pair. A pair that reuses an id or a key replaces the earlier
    /// pair entirely so both directions stay consistent.
    pub fn insert(&mut self, id: &str, key: &str) {
        if let Some(old_key) = self.by_id.remove(id) {
            warn!("Duplicate {} id {} ({} replaced by {})", self.kind, id, old_key, key);
            self.by_key.remove(&old_key);
        }
        if let Some(old_id) = self.by_key.remove(key) {
            warn!("Duplicate {} {} ({} replaced by {})", self.kind, key, old_id, id);
            self.by_id.remove(&old_id);
        }
        self.by_id.insert(id.to_string(), key.to_string());
        self.by_key.insert(key.to_string(), id.to_string());
    }

    pub fn id(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    pub fn key(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
