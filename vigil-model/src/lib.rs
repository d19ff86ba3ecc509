//! Reactive, self-validating entity model for Vigil.
//!
//! Lets a domain object declare its fields, validate them against rules
//! attached at construction, track per-field error state, notify observers
//! of value and error changes, and re-check command enablement when watched
//! fields change:
//! - [`PropertyStore`] — name-keyed field values with "absent ⇒ default" reads
//! - [`ErrorStore`] — concurrent per-property error messages
//! - [`ValidationEngine`] — the serialized validate/reconcile/notify cycle
//! - [`CommandRegistry`] — command bindings keyed by name
//! - [`NotificationHub`] — property-changed and errors-changed observers
//! - [`Entity`] — owns all of the above
//!
//! Rendering, binding adapters and the rule vocabulary itself live outside
//! this crate.
//!
//! # Example
//!
//! ```
//! use vigil_model::{Entity, FnRule, RuleSet};
//!
//! let rules = RuleSet::new().with(FnRule::predicate("Name", "Name is required", |v| {
//!     Ok(!v.get::<String>("Name")?.is_empty())
//! }));
//! let person = Entity::new(rules);
//!
//! person.set("Name", "");
//! assert!(person.has_errors());
//!
//! person.set("Name", "Alice");
//! assert!(!person.has_errors());
//! ```

mod command;
mod config;
mod entity;
mod errors;
mod notify;
mod rules;
mod store;
mod validation;

pub use command::{Command, CommandBinding, CommandRegistry};
pub use config::EntityConfig;
pub use entity::Entity;
pub use errors::ErrorStore;
pub use notify::{NotificationHub, Observer, ObserverId, ObserverList};
pub use rules::{FnRule, Rule, RuleError, RuleResult, RuleSet};
pub use store::PropertyStore;
pub use validation::{CycleOutcome, CycleReport, MAX_PASSES, ValidationEngine};

pub use vigil_types::{
    Error, ErrorSnapshot, FromValue, PropertyError, PropertyName, PropertyValue, Result,
    Violation,
};
