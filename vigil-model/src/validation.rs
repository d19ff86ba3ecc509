//! The validation cycle.
//!
//! One cycle evaluates every rule against a snapshot of the entity's fields,
//! builds the new error entries and per-property view from the result,
//! publishes both, and then emits change notifications:
//!
//! 1. errors-changed for each property that was in the error store but
//!    produced no violation;
//! 2. errors-changed for every property with violations, even when its
//!    messages did not change;
//! 3. property-changed for `HasErrors`, `ErrorList` and `PropertyErrors`.
//!
//! The error store and the view are each swapped in under one write lock,
//! so concurrent readers never see a half-reconciled cycle. Cycles on one
//! entity are fully serialized.

use crate::entity::Entity;
use crate::rules::RuleSet;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};
use tracing::{debug, warn};
use vigil_types::{PropertyError, PropertyName, Violation};

/// Passes one `run` makes before it stops honouring deferred requests.
pub const MAX_PASSES: usize = 16;

/// What a completed cycle changed, in notification order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Properties removed from the error store.
    pub cleared: Vec<PropertyName>,
    /// Properties (re)inserted into the error store.
    pub flagged: Vec<PropertyName>,
}

/// Result of requesting a validation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran. When re-entrant requests were folded in, this is the
    /// report of the last pass.
    Completed(CycleReport),
    /// The request came from inside a cycle already running on this thread
    /// (an observer setting a field). The running cycle will pass again
    /// before it releases the entity, up to [`MAX_PASSES`] passes in total.
    Deferred,
}

impl CycleOutcome {
    /// The report, if the cycle ran.
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Deferred => None,
        }
    }
}

/// Runs validation cycles for one entity.
#[derive(Debug)]
pub struct ValidationEngine {
    rules: RuleSet,
    gate: Mutex<()>,
    owner: Mutex<Option<ThreadId>>,
    rerun: AtomicBool,
}

struct OwnerGuard<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
}

impl<'a> OwnerGuard<'a> {
    fn claim(owner: &'a Mutex<Option<ThreadId>>, id: ThreadId) -> Self {
        *owner.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);
        Self { owner }
    }
}

impl Drop for OwnerGuard<'_> {
    fn drop(&mut self) {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ValidationEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            gate: Mutex::new(()),
            owner: Mutex::new(None),
            rerun: AtomicBool::new(false),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn running_on(&self, id: ThreadId) -> bool {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) == Some(id)
    }

    /// Runs a cycle for `entity`, waiting for any cycle already running on
    /// another thread to finish first.
    pub fn run(&self, entity: &Entity) -> CycleOutcome {
        let current = thread::current().id();
        if self.running_on(current) {
            self.rerun.store(true, Ordering::SeqCst);
            debug!("validation requested during a running cycle, deferring");
            return CycleOutcome::Deferred;
        }

        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let _owner = OwnerGuard::claim(&self.owner, current);
        self.rerun.store(false, Ordering::SeqCst);

        let mut report = self.cycle(entity);
        let mut passes = 1;
        while self.rerun.swap(false, Ordering::SeqCst) {
            if passes == MAX_PASSES {
                warn!(
                    passes,
                    "observers kept requesting validation, giving up on further passes"
                );
                break;
            }
            debug!("re-running validation for changes made during the cycle");
            report = self.cycle(entity);
            passes += 1;
        }
        CycleOutcome::Completed(report)
    }

    fn cycle(&self, entity: &Entity) -> CycleReport {
        let values = entity.values_snapshot();
        let violations = self.rules.evaluate(&values);
        debug!(
            rules = self.rules.len(),
            violations = violations.len(),
            "validation cycle started"
        );

        let groups = group_by_property(violations);

        let mut view: BTreeMap<PropertyName, PropertyError> = values
            .names()
            .into_iter()
            .map(|name| (name.clone(), PropertyError::valid(name)))
            .collect();
        let mut entries = BTreeMap::new();
        for (name, messages) in &groups {
            view.insert(name.clone(), PropertyError::invalid(name.clone(), messages));
            entries.insert(name.clone(), messages.clone());
        }

        let previous = entity.errors.replace_all(entries);
        entity.replace_view(view);

        let report = CycleReport {
            cleared: previous
                .into_keys()
                .filter(|name| !groups.iter().any(|(failing, _)| failing == name))
                .collect(),
            flagged: groups.into_iter().map(|(name, _)| name).collect(),
        };

        for name in report.cleared.iter().chain(&report.flagged) {
            entity.hub.notify_errors_changed(name);
        }
        for aggregate in PropertyName::aggregates() {
            entity.hub.notify_property_changed(&aggregate);
        }

        debug!(
            cleared = report.cleared.len(),
            flagged = report.flagged.len(),
            "validation cycle finished"
        );
        report
    }
}

/// Groups messages by property in first-appearance order, keeping the
/// rule-evaluation order of messages within each property.
fn group_by_property(violations: Vec<Violation>) -> Vec<(PropertyName, Vec<String>)> {
    let mut groups: Vec<(PropertyName, Vec<String>)> = Vec::new();
    let mut index: HashMap<PropertyName, usize> = HashMap::new();

    for violation in violations {
        for name in violation.properties {
            let slot = *index.entry(name.clone()).or_insert_with(|| {
                groups.push((name, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(violation.message.clone());
        }
    }
    groups
}
