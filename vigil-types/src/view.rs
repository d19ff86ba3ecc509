//! Validation records surfaced to observers.

use crate::PropertyName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single rule failure.
///
/// One violation may apply to several properties; the engine files the
/// message under each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub message: String,
    pub properties: Vec<PropertyName>,
}

impl Violation {
    /// Creates a violation that applies to every listed property.
    pub fn new<I, N>(message: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PropertyName>,
    {
        Self {
            message: message.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a violation for a single property.
    pub fn on(property: impl Into<PropertyName>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            properties: vec![property.into()],
        }
    }
}

/// Per-property validity view, rebuilt on every validation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyError {
    pub property: PropertyName,
    pub has_error: bool,
    /// All messages for the property joined with ", ". Empty when valid.
    pub message: String,
}

impl PropertyError {
    /// A view entry for a property with no current violations.
    #[must_use]
    pub fn valid(property: PropertyName) -> Self {
        Self {
            property,
            has_error: false,
            message: String::new(),
        }
    }

    /// A view entry for a property with the given messages.
    #[must_use]
    pub fn invalid(property: PropertyName, messages: &[String]) -> Self {
        Self {
            property,
            has_error: true,
            message: messages.join(", "),
        }
    }
}

/// Point-in-time copy of an entity's error store.
///
/// Absence of a property means it is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSnapshot(BTreeMap<PropertyName, Vec<String>>);

impl ErrorSnapshot {
    /// Messages recorded for a property, if it is in error.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&[String]> {
        self.0.get(property).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if at least one entry carries a message.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.values().any(|messages| !messages.is_empty())
    }

    /// Property names in the snapshot, sorted.
    pub fn names(&self) -> impl Iterator<Item = &PropertyName> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyName, &Vec<String>)> {
        self.0.iter()
    }

    /// Consumes the snapshot, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<PropertyName, Vec<String>> {
        self.0
    }
}

impl From<BTreeMap<PropertyName, Vec<String>>> for ErrorSnapshot {
    fn from(map: BTreeMap<PropertyName, Vec<String>>) -> Self {
        Self(map)
    }
}
