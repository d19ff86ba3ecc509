//! The validatable entity.
//!
//! An [`Entity`] owns the field store, the error store, the per-property
//! error view, the command bindings and the notification hub. Domain types
//! wrap one and expose typed accessors over [`Entity::get`] and
//! [`Entity::set`].

use crate::command::{Command, CommandRegistry};
use crate::config::EntityConfig;
use crate::errors::ErrorStore;
use crate::notify::NotificationHub;
use crate::rules::RuleSet;
use crate::store::PropertyStore;
use crate::validation::{CycleOutcome, ValidationEngine};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;
use vigil_types::{
    Error, ErrorSnapshot, FromValue, PropertyError, PropertyName, PropertyValue, Result,
};

/// A reactive, self-validating object.
#[derive(Debug)]
pub struct Entity {
    values: RwLock<PropertyStore>,
    pub(crate) errors: ErrorStore,
    view: RwLock<BTreeMap<PropertyName, PropertyError>>,
    commands: CommandRegistry,
    pub(crate) hub: NotificationHub,
    engine: ValidationEngine,
    config: EntityConfig,
}

impl Entity {
    /// Creates an entity with the default configuration.
    pub fn new(rules: RuleSet) -> Self {
        Self::with_config(rules, EntityConfig::default())
    }

    /// Creates an entity with an explicit configuration.
    pub fn with_config(rules: RuleSet, config: EntityConfig) -> Self {
        let commands = if config.reject_duplicate_commands {
            CommandRegistry::rejecting_duplicates()
        } else {
            CommandRegistry::new()
        };
        Self {
            values: RwLock::new(PropertyStore::new()),
            errors: ErrorStore::new(),
            view: RwLock::new(BTreeMap::new()),
            commands,
            hub: NotificationHub::new(),
            engine: ValidationEngine::new(rules),
            config,
        }
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    /// Observer registration for property-changed and errors-changed.
    pub fn notifications(&self) -> &NotificationHub {
        &self.hub
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    // ── Fields ───────────────────────────────────────────────────

    /// Reads a typed field; unset fields read as `T::default()`.
    pub fn get<T: FromValue + Default>(&self, name: &str) -> Result<T> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
    }

    /// Reads the raw stored value.
    pub fn get_value(&self, name: &str) -> Option<PropertyValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_value(name)
            .cloned()
    }

    /// Sets a field.
    ///
    /// Stores the value, fires property-changed, runs a validation cycle
    /// (unless the name is one of the aggregate view properties or
    /// `validate_on_set` is off) and finally re-evaluates every command bound
    /// to the property.
    pub fn set(&self, name: impl Into<PropertyName>, value: impl Into<PropertyValue>) {
        let name = name.into();
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(name.clone(), value);
        trace!(property = %name, "property set");

        self.hub.notify_property_changed(&name);

        if self.config.validate_on_set && !name.is_aggregate() {
            self.validate();
        }

        self.commands.notify_property_changed(name.as_str());
    }

    pub(crate) fn values_snapshot(&self) -> PropertyStore {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── Validation ───────────────────────────────────────────────

    /// Runs a validation cycle on the calling thread.
    pub fn validate(&self) -> CycleOutcome {
        self.engine.run(self)
    }

    /// Schedules a validation cycle on the runtime's blocking pool and
    /// returns without waiting for it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn validate_async(self: &Arc<Self>) -> Result<JoinHandle<CycleOutcome>> {
        let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let entity = Arc::clone(self);
        Ok(handle.spawn_blocking(move || entity.validate()))
    }

    // ── Error queries ────────────────────────────────────────────

    /// True if any property currently has an error.
    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }

    /// Point-in-time copy of all current errors.
    pub fn error_list(&self) -> ErrorSnapshot {
        self.errors.snapshot()
    }

    /// Current messages for one property, or `None` if it is valid.
    pub fn errors_for(&self, name: &str) -> Option<Vec<String>> {
        self.errors.get(name)
    }

    /// The per-property validity view from the last cycle, sorted by name.
    pub fn property_errors(&self) -> Vec<PropertyError> {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn property_error(&self, name: &str) -> Option<PropertyError> {
        self.view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub(crate) fn replace_view(&self, view: BTreeMap<PropertyName, PropertyError>) {
        *self.view.write().unwrap_or_else(PoisonError::into_inner) = view;
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Binds a command to the properties that should re-check its enablement.
    pub fn bind_command<I, N>(
        &self,
        name: impl Into<String>,
        command: Arc<dyn Command>,
        properties: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = N>,
        N: Into<PropertyName>,
    {
        self.commands.bind(name, command, properties)
    }

    pub fn unbind_command(&self, name: &str) -> bool {
        self.commands.unbind(name)
    }
}
