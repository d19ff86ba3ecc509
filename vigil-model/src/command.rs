//! Command enablement bindings.
//!
//! A command is bound by name to the properties whose change should make it
//! re-check whether it can execute. The registry is consulted on every raw
//! field set, independently of the validation outcome.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};
use vigil_types::{Error, PropertyName, Result};

/// A UI command whose enablement depends on entity state.
pub trait Command: Send + Sync {
    /// Re-evaluates whether the command can execute.
    fn reevaluate(&self);
}

impl<F> Command for F
where
    F: Fn() + Send + Sync,
{
    fn reevaluate(&self) {
        self()
    }
}

/// A command together with the properties it watches.
#[derive(Clone)]
pub struct CommandBinding {
    pub command: Arc<dyn Command>,
    pub properties: HashSet<PropertyName>,
}

impl CommandBinding {
    /// True if a change to `name` should re-evaluate this command.
    pub fn watches(&self, name: &str) -> bool {
        self.properties.contains(name)
    }
}

impl std::fmt::Debug for CommandBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBinding")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// Name-keyed command bindings.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    bindings: RwLock<BTreeMap<String, CommandBinding>>,
    reject_duplicates: bool,
}

impl CommandRegistry {
    /// Creates a registry where rebinding a name overwrites it with a warning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry where rebinding a name is an error.
    pub fn rejecting_duplicates() -> Self {
        Self {
            bindings: RwLock::default(),
            reject_duplicates: true,
        }
    }

    /// Binds `command` under `name`, watching `properties`.
    ///
    /// An existing binding with the same name is replaced (and logged), or
    /// rejected with `Error::DuplicateCommand` if this registry rejects
    /// duplicates. A rejected rebind leaves the original binding in place.
    pub fn bind<I, N>(
        &self,
        name: impl Into<String>,
        command: Arc<dyn Command>,
        properties: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = N>,
        N: Into<PropertyName>,
    {
        let name = name.into();
        let binding = CommandBinding {
            command,
            properties: properties.into_iter().map(Into::into).collect(),
        };

        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        if bindings.contains_key(&name) {
            if self.reject_duplicates {
                return Err(Error::DuplicateCommand(name));
            }
            warn!(command = %name, "command rebound, previous binding replaced");
        }
        debug!(command = %name, watched = binding.properties.len(), "command bound");
        bindings.insert(name, binding);
        Ok(())
    }

    /// Removes a binding. Returns false if nothing was bound under `name`.
    pub fn unbind(&self, name: &str) -> bool {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-evaluates every command watching `name`, returning how many ran.
    ///
    /// Commands run after the registry lock is released, so a command may
    /// bind or unbind from inside `reevaluate`.
    pub fn notify_property_changed(&self, name: &str) -> usize {
        let matching: Vec<Arc<dyn Command>> = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|binding| binding.watches(name))
            .map(|binding| Arc::clone(&binding.command))
            .collect();

        for command in &matching {
            command.reevaluate();
        }
        matching.len()
    }
}
