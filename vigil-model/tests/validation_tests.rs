mod common;

use common::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use vigil_model::{
    CycleOutcome, CycleReport, Entity, FnRule, MAX_PASSES, PropertyName, RuleSet, Violation,
};

fn names(items: &[&str]) -> Vec<PropertyName> {
    items.iter().map(|s| PropertyName::new(s)).collect()
}

// ── Cycle report ─────────────────────────────────────────────────

#[test]
fn first_cycle_flags_failing_properties() {
    let entity = person();
    let outcome = entity.validate();
    assert_eq!(
        outcome,
        CycleOutcome::Completed(CycleReport {
            cleared: Vec::new(),
            flagged: names(&["Name"]),
        })
    );
}

#[test]
fn cycle_with_no_rules_emits_only_aggregates() {
    let entity = Entity::new(RuleSet::new());
    let recorder = Recorder::attach(&entity);

    let outcome = entity.validate();
    assert_eq!(outcome.report(), Some(&CycleReport::default()));
    assert_eq!(recorder.take(), aggregate_tail());
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn removals_are_notified_before_insertions() {
    let entity = person_with(vigil_model::EntityConfig {
        validate_on_set: false,
        ..Default::default()
    });
    entity.set("Name", "");
    entity.set("Age", 50);
    entity.validate();

    entity.set("Name", "Alice");
    entity.set("Age", 300);
    let recorder = Recorder::attach(&entity);
    let outcome = entity.validate();

    let mut expected = vec![errors("Name"), errors("Age")];
    expected.extend(aggregate_tail());
    assert_eq!(recorder.take(), expected);
    assert_eq!(
        outcome.report().unwrap(),
        &CycleReport {
            cleared: names(&["Name"]),
            flagged: names(&["Age"]),
        }
    );
}

#[test]
fn insertions_follow_rule_evaluation_order() {
    let rules = RuleSet::new()
        .with(FnRule::new("Zeta", |_| Ok(vec![Violation::on("Zeta", "z")])))
        .with(FnRule::new("Alpha", |_| Ok(vec![Violation::on("Alpha", "a")])));
    let entity = Entity::new(rules);
    let recorder = Recorder::attach(&entity);

    entity.validate();

    let mut expected = vec![errors("Zeta"), errors("Alpha")];
    expected.extend(aggregate_tail());
    assert_eq!(recorder.take(), expected);
}

#[test]
fn violation_spanning_properties_is_filed_under_each() {
    let rules = RuleSet::new().with(FnRule::new("Start", |v| {
        let start = v.get::<i64>("Start")?;
        let end = v.get::<i64>("End")?;
        Ok(if start > end {
            vec![Violation::new("Start must not be after End", ["Start", "End"])]
        } else {
            Vec::new()
        })
    }));
    let entity = Entity::new(rules);
    entity.set("End", 1);
    entity.set("Start", 5);

    let snapshot = entity.error_list();
    assert_eq!(snapshot.get("Start"), snapshot.get("End"));
    assert_eq!(
        snapshot.get("End"),
        Some(&messages(&["Start must not be after End"])[..])
    );
}

// ── Idempotence ──────────────────────────────────────────────────

#[test]
fn repeated_cycles_are_idempotent() {
    let entity = person();
    entity.set("Name", "");
    entity.set("Age", 999);

    let recorder = Recorder::attach(&entity);
    entity.validate();
    let first_snapshot = entity.error_list();
    let first_events = recorder.take();

    entity.validate();
    let second_snapshot = entity.error_list();
    let second_events = recorder.take();

    assert_eq!(first_snapshot, second_snapshot);
    assert_eq!(first_events, second_events);
}

#[test]
fn no_removal_notification_for_already_valid_properties() {
    let entity = person();
    entity.set("Name", "Alice");
    entity.set("Age", 30);

    let recorder = Recorder::attach(&entity);
    let outcome = entity.validate();

    assert_eq!(outcome.report(), Some(&CycleReport::default()));
    assert_eq!(recorder.take(), aggregate_tail());
}

/// Content-identical violations are removed and re-inserted every cycle, so
/// errors-changed fires again for them.
#[test]
fn unchanged_violation_still_refires_errors_changed() {
    let entity = person();
    entity.set("Name", "Alice");
    entity.set("Age", 200);

    let recorder = Recorder::attach(&entity);
    entity.validate();
    entity.validate();

    assert_eq!(recorder.errors_changed(), vec!["Age", "Age"]);
    assert_eq!(entity.errors_for("Age"), Some(messages(&[AGE_RANGE])));
}

// ── Re-entrancy ──────────────────────────────────────────────────

#[test]
fn observer_setting_a_field_mid_cycle_defers_instead_of_deadlocking() {
    let entity = Arc::new(person());
    let weak: Weak<Entity> = Arc::downgrade(&entity);

    entity.notifications().on_errors_changed(move |name| {
        let Some(entity) = weak.upgrade() else { return };
        if name == "Name" && !entity.get::<bool>("Touched").unwrap() {
            entity.set("Touched", true);
        }
    });

    let outcome = entity.validate();
    assert!(matches!(outcome, CycleOutcome::Completed(_)));
    assert!(entity.get::<bool>("Touched").unwrap());
    // The deferred request re-ran the cycle, so the view includes the new field.
    assert!(entity.property_error("Touched").is_some());
}

#[test]
fn nested_validate_call_reports_deferred() {
    let entity = Arc::new(person());
    let weak = Arc::downgrade(&entity);
    let nested = Arc::new(std::sync::Mutex::new(Vec::new()));
    let record = Arc::clone(&nested);

    let id = entity.notifications().on_property_changed(move |name| {
        if name != "HasErrors" || !record.lock().unwrap().is_empty() {
            return;
        }
        if let Some(entity) = weak.upgrade() {
            let outcome = entity.validate();
            record.lock().unwrap().push(outcome);
        }
    });

    entity.validate();
    entity.notifications().unsubscribe(id);

    assert_eq!(*nested.lock().unwrap(), vec![CycleOutcome::Deferred]);
}

#[test]
fn observer_that_always_sets_a_field_stops_at_the_pass_cap() {
    let passes = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&passes);
    let rules = person_rules().with(FnRule::new("Spin", move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }));
    let entity = Arc::new(Entity::new(rules));
    let weak = Arc::downgrade(&entity);

    entity.notifications().on_errors_changed(move |name| {
        let Some(entity) = weak.upgrade() else { return };
        if name == "Name" {
            let spin = entity.get::<i64>("Spin").unwrap();
            entity.set("Spin", spin + 1);
        }
    });

    let outcome = entity.validate();
    assert!(matches!(outcome, CycleOutcome::Completed(_)));
    assert_eq!(passes.load(Ordering::SeqCst), MAX_PASSES);
    assert_eq!(entity.get::<i64>("Spin").unwrap(), MAX_PASSES as i64);
}
