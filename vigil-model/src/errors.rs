//! Per-property error store.
//!
//! Source of truth for "does this entity have errors". Readers take a shared
//! lock and never wait on each other. The validation cycle publishes its
//! result with a single [`ErrorStore::replace_all`], so a reader sees either
//! the previous cycle's entries or the new ones, never a mix.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;
use vigil_types::{ErrorSnapshot, PropertyName};

/// Concurrent map from property name to its current error messages.
#[derive(Debug, Default)]
pub struct ErrorStore {
    entries: RwLock<BTreeMap<PropertyName, Vec<String>>>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<PropertyName, Vec<String>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<PropertyName, Vec<String>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites the messages for a property.
    pub fn insert(&self, name: PropertyName, messages: Vec<String>) -> Option<Vec<String>> {
        self.write().insert(name, messages)
    }

    /// Removes a property, marking it valid.
    pub fn remove(&self, name: &str) -> Option<Vec<String>> {
        self.write().remove(name)
    }

    /// Swaps in a whole new set of entries under one write lock and returns
    /// the entries it replaced.
    pub fn replace_all(
        &self,
        entries: BTreeMap<PropertyName, Vec<String>>,
    ) -> BTreeMap<PropertyName, Vec<String>> {
        std::mem::replace(&mut *self.write(), entries)
    }

    /// Current messages for a property, or `None` if it is valid.
    pub fn get(&self, name: &str) -> Option<Vec<String>> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names currently in error, sorted.
    pub fn names(&self) -> Vec<PropertyName> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// True if any entry holds at least one message.
    ///
    /// An entry with an empty list is treated as valid and logged, since the
    /// validation cycle never writes one.
    pub fn has_errors(&self) -> bool {
        let entries = self.read();
        let mut found = false;
        for (name, messages) in entries.iter() {
            if messages.is_empty() {
                warn!(property = %name, "error store holds an empty message list");
            } else {
                found = true;
            }
        }
        found
    }

    /// Entries whose message list is empty.
    pub fn inconsistent_entries(&self) -> Vec<PropertyName> {
        self.read()
            .iter()
            .filter(|(_, messages)| messages.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Independent copy of the full store.
    pub fn snapshot(&self) -> ErrorSnapshot {
        ErrorSnapshot::from(self.read().clone())
    }
}
