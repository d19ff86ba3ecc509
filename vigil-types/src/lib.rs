//! Core value types for Vigil.
//!
//! This crate defines the plugin-agnostic types shared by every layer of the
//! reactive entity engine:
//! - Property identifiers (interned names, including the reserved aggregates)
//! - Tagged property values and typed extraction
//! - Validation records (violations, per-property error views, snapshots)
//!
//! Nothing here knows how rules are authored or how a UI binds to them.

mod name;
mod value;
mod view;

pub use name::PropertyName;
pub use value::{FromValue, PropertyValue};
pub use view::{ErrorSnapshot, PropertyError, Violation};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a caller breaks the entity contract.
///
/// Rule violations are never reported through this type; they are data and
/// live in the error store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("property '{property}' holds {found}, not {expected}")]
    TypeMismatch {
        property: PropertyName,
        expected: &'static str,
        found: &'static str,
    },

    #[error("command already bound: {0}")]
    DuplicateCommand(String),

    #[error("no async runtime available to schedule validation")]
    NoRuntime,

    #[error("invalid configuration: {0}")]
    Config(String),
}
