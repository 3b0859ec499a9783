//! Person prefetch, role backfill and actor role resolution

use audit_context::{InMemoryPersonSource, PersonSource};
use audit_engine::prelude::*;
use audit_model::{ObjectRef, PersonRef, RevisionAction};
use audit_test_utils::{
    context, context_with, control_revision, mapping, people, subject, with_acl,
    FailingPersonSource, SlowPersonSource, ADMIN, ASSIGNEE,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Assignee handed from person 10 to person 11
fn handover() -> RevisionHistory {
    RevisionHistory::new(subject())
        .with_compare(with_acl(control_revision(1, 10), &[(ASSIGNEE, 10)]))
        .with_object(vec![with_acl(control_revision(2, 20), &[(ASSIGNEE, 11)])])
}

fn role_cell(report: &RevisionDiffReport) -> audit_model::SharedRoleDiff {
    report.entries[0]
        .as_object()
        .unwrap()
        .changes
        .iter()
        .find_map(Change::as_access_control)
        .cloned()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn newer_computation_supersedes_older_backfill() {
    let source = Arc::new(SlowPersonSource::new(Duration::from_millis(200), people()));
    let engine = RevisionDiffEngine::new(context_with(source), EngineConfig::new());

    let first = engine.compute(&handover()).await;
    let second = engine.compute(&handover()).await;
    assert_eq!((first.generation, second.generation), (1, 2));
    assert_eq!(engine.current_generation(), 2);

    let stale = role_cell(&first);
    assert_eq!(
        first.backfill.run().await,
        BackfillOutcome::Superseded {
            generation: 1,
            current: 2
        }
    );
    assert!(stale.read().is_loading);

    let fresh = role_cell(&second);
    assert!(second.backfill.run().await.is_applied());
    assert_eq!(fresh.read().new_val, vec!["bob@example.com".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn slow_prefetch_times_out_into_error_state() {
    let source = Arc::new(SlowPersonSource::new(Duration::from_secs(60), people()));
    let config = EngineConfig::new().with_prefetch_timeout(Duration::from_millis(50));
    let engine = RevisionDiffEngine::new(context_with(source), config);

    let report = engine.compute(&handover()).await;
    let cell = role_cell(&report);

    match report.backfill.run().await {
        BackfillOutcome::Failed { rows, reason } => {
            assert_eq!(rows, 1);
            assert!(reason.contains("timed out"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    let state = cell.read();
    assert!(!state.is_loading);
    assert!(state.load_error.as_deref().unwrap().contains("timed out"));
}

#[tokio::test]
async fn failed_prefetch_marks_rows() {
    let engine = RevisionDiffEngine::new(
        context_with(Arc::new(FailingPersonSource)),
        EngineConfig::new(),
    );
    let report = engine.compute(&handover()).await;
    let cell = role_cell(&report);

    let outcome = report.backfill.run().await;
    assert!(matches!(outcome, BackfillOutcome::Failed { rows: 1, .. }));

    let state = cell.read();
    assert!(!state.is_loading);
    assert!(state.orig_val.is_empty());
    assert!(state.load_error.as_deref().unwrap().contains("backend unavailable"));
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_loading() {
    let source = Arc::new(SlowPersonSource::new(Duration::from_secs(5), people()));
    let engine = RevisionDiffEngine::new(context_with(source), EngineConfig::new());

    let report = engine.compute(&handover()).await;
    assert!(report.backfill.has_prefetch());
    let cell = role_cell(&report);

    let outcome = report.backfill.cancel();
    assert!(matches!(outcome, BackfillOutcome::Failed { rows: 1, .. }));
    assert_eq!(cell.read().load_error.as_deref(), Some("person prefetch cancelled"));
}

#[tokio::test]
async fn cached_people_skip_the_fetch() {
    let source = Arc::new(SlowPersonSource::new(Duration::from_millis(1), people()));
    let ctx = context_with(Arc::clone(&source) as Arc<dyn PersonSource>);
    for person in people() {
        ctx.people.insert(person);
    }
    let engine = RevisionDiffEngine::new(ctx, EngineConfig::new());

    let report = engine.compute(&handover()).await;
    assert!(!report.backfill.has_prefetch());
    assert_eq!(report.backfill.pending_rows(), 1);
    assert!(report.backfill.run().await.is_applied());
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn detached_prefetch_still_warms_the_cache() {
    let ctx = context();
    let people = Arc::clone(&ctx.people);
    let engine = RevisionDiffEngine::new(ctx, EngineConfig::new());

    let report = engine.compute(&handover()).await;
    drop(report);

    for _ in 0..100 {
        if people.len() == 2 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(people.len(), 2);
}

#[tokio::test]
async fn history_without_roles_has_nothing_pending() {
    let history = RevisionHistory::new(subject())
        .with_object(vec![control_revision(1, 10).with_field("title", json!("T"))]);
    let report = RevisionDiffEngine::new(context(), EngineConfig::new())
        .compute(&history)
        .await;

    assert_eq!(report.backfill.pending_rows(), 0);
    assert_eq!(report.backfill.run().await, BackfillOutcome::Applied { rows: 0 });
}

#[tokio::test]
async fn object_role_comes_from_next_snapshot_acl() {
    let history = RevisionHistory::new(subject()).with_object(vec![
        with_acl(control_revision(1, 10), &[(ASSIGNEE, 10)])
            .with_field("title", json!("A"))
            .by(PersonRef::new(10)),
        with_acl(control_revision(2, 20), &[(ASSIGNEE, 10), (ADMIN, 10)])
            .with_field("title", json!("B"))
            .by(PersonRef::new(10)),
        with_acl(control_revision(3, 30), &[(ASSIGNEE, 10), (ADMIN, 10)])
            .with_field("title", json!("C"))
            .by(PersonRef::new(12)),
    ]);
    let engine = RevisionDiffEngine::new(
        context(),
        EngineConfig::new().with_default_role("Reader"),
    );

    let report = engine.compute(&history).await;
    let roles: Vec<_> = report
        .entries
        .iter()
        .map(|e| e.as_object().unwrap().role.clone())
        .collect();
    assert_eq!(roles, vec!["Reader", "Admin", "Assignee"]);
}

#[tokio::test]
async fn mapping_role_comes_from_snapshot_in_force() {
    let history = RevisionHistory::new(subject())
        .with_object(vec![
            with_acl(control_revision(1, 10), &[(ASSIGNEE, 10)]),
            with_acl(control_revision(2, 30), &[(ADMIN, 10)]),
        ])
        .with_mappings(vec![
            mapping(1, ObjectRef::stub("Risk", 2), RevisionAction::Created, 5)
                .by(PersonRef::new(10)),
            mapping(2, ObjectRef::stub("Risk", 2), RevisionAction::Modified, 20)
                .by(PersonRef::new(10)),
            mapping(3, ObjectRef::stub("Risk", 2), RevisionAction::Deleted, 40)
                .by(PersonRef::new(10)),
        ]);

    let report = RevisionDiffEngine::new(context(), EngineConfig::new())
        .compute(&history)
        .await;
    let roles: Vec<_> = report
        .entries
        .iter()
        .filter_map(HistoryEntry::as_mapping)
        .map(|m| (m.updated_at.timestamp(), m.role.clone()))
        .collect();
    assert_eq!(
        roles,
        vec![
            (40, "Admin".to_string()),
            (20, "Assignee".to_string()),
            (5, "none".to_string()),
        ]
    );
}

#[tokio::test]
async fn in_memory_source_is_shared_between_computations() {
    let source = Arc::new(InMemoryPersonSource::with_people(people()));
    let engine = RevisionDiffEngine::new(context_with(source), EngineConfig::new());

    let first = engine.compute(&handover()).await;
    assert!(first.backfill.run().await.is_applied());

    let second = engine.compute(&handover()).await;
    assert!(!second.backfill.has_prefetch());
}
