//! Process-wide bridge registry.
//!
//! Emitted bridges register a factory for their qualified class name; the
//! runtime polls the registry only after the ready signal has fired. The
//! registry mirrors that contract with an explicit two-phase lifecycle:
//! registrations made before `mark_ready` are deferred and become visible
//! atomically when the signal fires; after the signal the registry is
//! read-only and late registrations are rejected.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEntry {
    pub qualified_name: String,
    pub bridge_name: String,
}

#[derive(Debug, Default)]
pub struct BridgeRegistry {
    ready: bool,
    deferred: Vec<RegistrationEntry>,
    entries: HashMap<String, RegistrationEntry>,
}

impl BridgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a registration. Before the ready signal the entry is deferred;
    /// afterwards the registry no longer mutates and the call is dropped.
    pub fn register(&mut self, entry: RegistrationEntry) {
        if self.ready {
            warn!(
                "rejected registration of `{}` after the ready signal",
                entry.qualified_name
            );
            return;
        }
        self.deferred.push(entry);
    }

    /// Fire the ready signal: deferred registrations become visible, in
    /// registration order. The first registration of a qualified name wins;
    /// duplicates are reported and dropped.
    pub fn mark_ready(&mut self) {
        for entry in self.deferred.drain(..) {
            if self.entries.contains_key(&entry.qualified_name) {
                warn!(
                    "duplicate registration of `{}` ignored",
                    entry.qualified_name
                );
                continue;
            }
            self.entries.insert(entry.qualified_name.clone(), entry);
        }
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Entry for `qualified_name`. Always `None` before the ready signal.
    pub fn get(&self, qualified_name: &str) -> Option<&RegistrationEntry> {
        self.entries.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.entries.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all state and return to the pre-ready phase. For rebuild drivers
    /// and tests.
    pub fn reset(&mut self) {
        self.ready = false;
        self.deferred.clear();
        self.entries.clear();
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_REGISTRY: Mutex<BridgeRegistry> = Mutex::new(BridgeRegistry::new());
}

pub fn global_registry() -> &'static Mutex<BridgeRegistry> {
    &GLOBAL_REGISTRY
}
