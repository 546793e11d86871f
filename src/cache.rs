//! Classification memoization.
//!
//! Deep ancestor chains would otherwise re-classify the same class once per
//! descendant. Entries are keyed by qualified class name and guarded by a
//! SHA-256 fingerprint of the serialized model, so an edited class is
//! recomputed instead of served stale. The cache is the only state shared
//! between concurrently compiling units and is synchronized for that reason.

use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::classify::MemberSet;
use crate::model::ComponentClassModel;

struct CacheEntry {
    fingerprint: String,
    members: Arc<MemberSet>,
}

#[derive(Default)]
pub struct ClassificationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprint(model: &ComponentClassModel) -> String {
        let serialized = serde_json::to_string(model).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(serialized.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Memoized member set for `model`, or `None` when absent or when the
    /// model changed since the entry was stored.
    pub fn get(&self, model: &ComponentClassModel) -> Option<Arc<MemberSet>> {
        let entries = self.entries.lock().expect("classification cache poisoned");
        let entry = entries.get(&model.qualified_name)?;
        if entry.fingerprint != Self::fingerprint(model) {
            return None;
        }
        debug!("classification cache hit for {}", model.qualified_name);
        Some(entry.members.clone())
    }

    pub fn insert(&self, model: &ComponentClassModel, members: Arc<MemberSet>) {
        let mut entries = self.entries.lock().expect("classification cache poisoned");
        entries.insert(
            model.qualified_name.clone(),
            CacheEntry {
                fingerprint: Self::fingerprint(model),
                members,
            },
        );
    }
}
