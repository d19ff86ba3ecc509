//! Shared fixtures for entity tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use vigil_model::{Entity, EntityConfig, FnRule, PropertyName, RuleSet};

pub const NAME_REQUIRED: &str = "Name is required";
pub const AGE_RANGE: &str = "Age must be between 0 and 120";

/// A "Name" required-rule and an "Age" range-rule over [0, 120].
pub fn person_rules() -> RuleSet {
    RuleSet::new()
        .with(FnRule::predicate("Name", NAME_REQUIRED, |values| {
            Ok(!values.get::<String>("Name")?.trim().is_empty())
        }))
        .with(FnRule::predicate("Age", AGE_RANGE, |values| {
            Ok((0..=120).contains(&values.get::<i64>("Age")?))
        }))
}

pub fn person() -> Entity {
    Entity::new(person_rules())
}

pub fn person_with(config: EntityConfig) -> Entity {
    Entity::with_config(person_rules(), config)
}

/// A notification seen by a [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
    Property(String),
    Errors(String),
}

pub fn property(name: &str) -> Seen {
    Seen::Property(name.to_string())
}

pub fn errors(name: &str) -> Seen {
    Seen::Errors(name.to_string())
}

/// Records every notification an entity emits, in order.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Recorder {
    pub fn attach(entity: &Entity) -> Self {
        let recorder = Self::default();
        let seen = Arc::clone(&recorder.seen);
        entity
            .notifications()
            .on_property_changed(move |name: &PropertyName| {
                seen.lock().unwrap().push(Seen::Property(name.to_string()));
            });
        let seen = Arc::clone(&recorder.seen);
        entity
            .notifications()
            .on_errors_changed(move |name: &PropertyName| {
                seen.lock().unwrap().push(Seen::Errors(name.to_string()));
            });
        recorder
    }

    /// Returns and clears everything recorded so far.
    pub fn take(&self) -> Vec<Seen> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }

    /// Errors-changed names recorded so far, without clearing.
    pub fn errors_changed(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Seen::Errors(name) => Some(name.clone()),
                Seen::Property(_) => None,
            })
            .collect()
    }
}

/// The three aggregate property-changed notifications closing every cycle.
pub fn aggregate_tail() -> Vec<Seen> {
    vec![
        property("HasErrors"),
        property("ErrorList"),
        property("PropertyErrors"),
    ]
}

pub fn messages(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
