//! Validation rules.
//!
//! Rules are opaque evaluators attached to an entity at construction time.
//! The engine only invokes them and aggregates what they report; it has no
//! knowledge of the rule vocabulary (required, range, pattern and so on).

use crate::store::PropertyStore;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use vigil_types::{PropertyName, Violation};

/// Failure of a rule to produce a verdict.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A field could not be read as the type the rule expects.
    #[error(transparent)]
    Property(#[from] vigil_types::Error),

    #[error("{0}")]
    Failed(String),
}

/// Result type for rule evaluation.
pub type RuleResult = Result<Vec<Violation>, RuleError>;

/// A declarative validation rule.
pub trait Rule: Send + Sync {
    /// The property this rule is attached to. A rule that fails to evaluate
    /// is reported as a violation on this property.
    fn property(&self) -> &PropertyName;

    /// Evaluates the rule against the entity's current field values.
    fn evaluate(&self, values: &PropertyStore) -> RuleResult;
}

type RuleFn = dyn Fn(&PropertyStore) -> RuleResult + Send + Sync;

/// A rule backed by a closure.
pub struct FnRule {
    property: PropertyName,
    check: Box<RuleFn>,
}

impl FnRule {
    /// Wraps a closure returning any number of violations.
    pub fn new<F>(property: impl Into<PropertyName>, check: F) -> Self
    where
        F: Fn(&PropertyStore) -> RuleResult + Send + Sync + 'static,
    {
        Self {
            property: property.into(),
            check: Box::new(check),
        }
    }

    /// A rule that reports `message` on its property whenever `predicate`
    /// returns false.
    pub fn predicate<F>(property: impl Into<PropertyName>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&PropertyStore) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        let property = property.into();
        let message = message.into();
        let target = property.clone();
        Self::new(property, move |values| {
            Ok(if predicate(values)? {
                Vec::new()
            } else {
                vec![Violation::on(target.clone(), message.clone())]
            })
        })
    }
}

impl Rule for FnRule {
    fn property(&self) -> &PropertyName {
        &self.property
    }

    fn evaluate(&self, values: &PropertyStore) -> RuleResult {
        (self.check)(values)
    }
}

impl std::fmt::Debug for FnRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

/// The ordered list of rules attached to an entity.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule, builder style.
    #[must_use]
    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.push(rule);
        self
    }

    pub fn push(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Arc::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in registration order.
    ///
    /// A rule that errors or panics does not stop the others; its failure is
    /// recorded as a violation on the rule's own property. Violations that
    /// name no property are dropped.
    pub fn evaluate(&self, values: &PropertyStore) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(values)));
            let reported = match outcome {
                Ok(Ok(found)) => found,
                Ok(Err(e)) => {
                    warn!(property = %rule.property(), error = %e, "validation rule failed");
                    vec![Violation::on(
                        rule.property().clone(),
                        format!("validation rule failed: {e}"),
                    )]
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    warn!(property = %rule.property(), reason = %reason, "validation rule panicked");
                    vec![Violation::on(
                        rule.property().clone(),
                        format!("validation rule failed: {reason}"),
                    )]
                }
            };

            for violation in reported {
                if violation.properties.is_empty() {
                    warn!(message = %violation.message, "dropping violation with no property");
                    continue;
                }
                violations.push(violation);
            }
        }
        violations
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet").field("len", &self.rules.len()).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}
