//! Observer notification channels.
//!
//! Two independent channels: property-changed and errors-changed. Observers
//! run synchronously, inline with the firing call, in registration order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use vigil_types::PropertyName;

/// Callback invoked with the name of the property that changed.
pub type Observer = Arc<dyn Fn(&PropertyName) + Send + Sync>;

/// Handle returned on registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

impl ObserverId {
    fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An ordered list of observers for one channel.
#[derive(Default)]
pub struct ObserverList {
    observers: RwLock<Vec<(ObserverId, Observer)>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Observer) -> ObserverId {
        let id = ObserverId::next();
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, observer));
        id
    }

    /// Removes an observer. Returns false if the id was not registered here.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes every observer. The list is copied first so callbacks may
    /// subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, name: &PropertyName) {
        let observers: Vec<Observer> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(name);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList").field("len", &self.len()).finish()
    }
}

/// The notification contract an entity emits into.
#[derive(Debug, Default)]
pub struct NotificationHub {
    property_changed: ObserverList,
    errors_changed: ObserverList,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property-changed observer.
    pub fn on_property_changed<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&PropertyName) + Send + Sync + 'static,
    {
        self.property_changed.subscribe(Arc::new(observer))
    }

    /// Registers an errors-changed observer.
    pub fn on_errors_changed<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&PropertyName) + Send + Sync + 'static,
    {
        self.errors_changed.subscribe(Arc::new(observer))
    }

    /// Removes an observer from whichever channel holds it.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.property_changed.unsubscribe(id) || self.errors_changed.unsubscribe(id)
    }

    pub fn notify_property_changed(&self, name: &PropertyName) {
        self.property_changed.notify(name);
    }

    pub fn notify_errors_changed(&self, name: &PropertyName) {
        self.errors_changed.notify(name);
    }

    /// Observers currently registered on the property-changed channel.
    pub fn property_changed_observers(&self) -> usize {
        self.property_changed.len()
    }

    /// Observers currently registered on the errors-changed channel.
    pub fn errors_changed_observers(&self) -> usize {
        self.errors_changed.len()
    }
}
