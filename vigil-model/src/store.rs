//! Name-keyed field storage.
//!
//! The store has no notification or validation side effects of its own; the
//! [`Entity`](crate::Entity) layers those on top of `set`.

use std::collections::HashMap;
use vigil_types::{Error, FromValue, PropertyName, PropertyValue, Result};

/// Backing storage for an entity's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    values: HashMap<PropertyName, PropertyValue>,
}

impl PropertyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a typed value.
    ///
    /// Returns `T::default()` when the property was never set, and
    /// `Error::TypeMismatch` when the stored variant cannot be read as `T`.
    pub fn get<T: FromValue + Default>(&self, name: &str) -> Result<T> {
        let Some(value) = self.values.get(name) else {
            return Ok(T::default());
        };
        T::from_value(value).ok_or_else(|| Error::TypeMismatch {
            property: PropertyName::new(name),
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    /// Returns the raw stored value.
    pub fn get_value(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Inserts or overwrites a value, returning the previous one.
    pub fn set(
        &mut self,
        name: impl Into<PropertyName>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Every property that has been assigned, sorted by name.
    pub fn names(&self) -> Vec<PropertyName> {
        let mut names: Vec<PropertyName> = self.values.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
