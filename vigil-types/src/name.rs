//! Property identifiers.
//!
//! Names are interned as `Arc<str>` so they can be cloned into notifications,
//! snapshots and command bindings without reallocating.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

const HAS_ERRORS: &str = "HasErrors";
const ERROR_LIST: &str = "ErrorList";
const PROPERTY_ERRORS: &str = "PropertyErrors";

/// Name of a property on a validatable entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyName(Arc<str>);

impl PropertyName {
    /// Creates a property name.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The aggregate "does the entity have any errors" property.
    #[must_use]
    pub fn has_errors() -> Self {
        Self::new(HAS_ERRORS)
    }

    /// The aggregate "full error snapshot" property.
    #[must_use]
    pub fn error_list() -> Self {
        Self::new(ERROR_LIST)
    }

    /// The aggregate "per-property validity view" property.
    #[must_use]
    pub fn property_errors() -> Self {
        Self::new(PROPERTY_ERRORS)
    }

    /// The three aggregate names, in the order their change notifications fire.
    #[must_use]
    pub fn aggregates() -> [Self; 3] {
        [Self::has_errors(), Self::error_list(), Self::property_errors()]
    }

    /// Returns true for the aggregate view properties. Setting one of these
    /// never triggers a validation cycle.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(&*self.0, HAS_ERRORS | ERROR_LIST | PROPERTY_ERRORS)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PropertyName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PropertyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PropertyName {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&PropertyName> for PropertyName {
    fn from(name: &PropertyName) -> Self {
        name.clone()
    }
}

impl PartialEq<str> for PropertyName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for PropertyName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for PropertyName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PropertyName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
