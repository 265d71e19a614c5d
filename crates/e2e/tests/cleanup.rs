//! Suite-level cleanup against the in-memory superhero service

use std::sync::Arc;

use superhero_e2e::cleanup::{CleanupPhase, SuiteCleanup};
use superhero_e2e::config::{CleanupConfig, CleanupMode};
use superhero_e2e::fake::{FakeBehaviour, FakeServer};
use superhero_e2e::registry::CreatedRegistry;
use superhero_e2e::rest::SuperheroClient;
use superhero_e2e::E2eError;

const PREFIX: &str = "Autotest_";

fn client(server: &Arc<FakeServer>) -> SuperheroClient {
    SuperheroClient::new(server.clone(), "http://fake")
}

fn config(mode: CleanupMode, forced_attempts: u32) -> CleanupConfig {
    CleanupConfig {
        enabled: true,
        mode,
        forced_attempts,
    }
}

#[tokio::test]
async fn forced_cleanup_removes_every_marked_hero() {
    let server = Arc::new(FakeServer::new(FakeBehaviour {
        delete_effective_every: 4,
        ..Default::default()
    }));
    let a = server.seed_hero("Autotest_One");
    let b = server.seed_hero("Autotest_Two");
    server.seed_hero("Clark Kent");

    let report = SuiteCleanup::new(client(&server), CreatedRegistry::new(), PREFIX, config(CleanupMode::Forced, 30))
        .run()
        .await
        .unwrap();

    assert_eq!(report.targets, vec![a, b]);
    assert_eq!(report.delete_calls, 60);
    assert_eq!(
        report.phases,
        vec![
            CleanupPhase::Idle,
            CleanupPhase::Scanning,
            CleanupPhase::Deleting { remaining: 2 },
            CleanupPhase::Deleting { remaining: 1 },
            CleanupPhase::Verifying,
            CleanupPhase::Done,
        ]
    );
    assert!(server.heroes().iter().all(|h| !h.is_marked(PREFIX)));
    assert_eq!(server.heroes().len(), 2);
}

#[tokio::test]
async fn forced_cleanup_is_idempotent() {
    let server = Arc::new(FakeServer::default());
    server.seed_hero("Autotest_One");

    let cleanup = || SuiteCleanup::new(client(&server), CreatedRegistry::new(), PREFIX, config(CleanupMode::Forced, 30));
    cleanup().run().await.unwrap();
    let second = cleanup().run().await.unwrap();

    assert!(second.targets.is_empty());
    assert_eq!(second.delete_calls, 0);
    assert_eq!(second.phases.last(), Some(&CleanupPhase::Done));
}

#[tokio::test]
async fn single_failed_delete_aborts_cleanup() {
    let server = Arc::new(FakeServer::new(FakeBehaviour {
        failing_delete_call: Some(5),
        ..Default::default()
    }));
    server.seed_hero("Autotest_One");

    let err = SuiteCleanup::new(client(&server), CreatedRegistry::new(), PREFIX, config(CleanupMode::Forced, 30))
        .run()
        .await
        .unwrap_err();

    match err {
        E2eError::Cleanup(reason) => assert!(reason.contains("call 5/30"), "{reason}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(server.delete_calls(), 5);
}

#[tokio::test]
async fn too_few_forced_deletes_leave_leftovers() {
    let server = Arc::new(FakeServer::new(FakeBehaviour {
        delete_effective_every: 3,
        ..Default::default()
    }));
    let id = server.seed_hero("Autotest_Stubborn");

    let err = SuiteCleanup::new(client(&server), CreatedRegistry::new(), PREFIX, config(CleanupMode::Forced, 2))
        .run()
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("still carry 'Autotest_'"), "{message}");
    assert!(message.contains(&id.to_string()), "{message}");
}

#[tokio::test]
async fn registry_cleanup_deletes_recorded_ids_once() {
    let server = Arc::new(FakeServer::default());
    let registry = CreatedRegistry::new();
    registry.record(server.seed_hero("Autotest_One"));
    registry.record(server.seed_hero("Autotest_Two"));

    let report = SuiteCleanup::new(client(&server), registry, PREFIX, config(CleanupMode::Registry, 30))
        .run()
        .await
        .unwrap();

    assert_eq!(report.delete_calls, 2);
    assert!(!report.phases.contains(&CleanupPhase::Scanning));
    assert_eq!(server.delete_calls(), 2);
}

#[tokio::test]
async fn registry_cleanup_misses_unrecorded_heroes() {
    let server = Arc::new(FakeServer::default());
    let registry = CreatedRegistry::new();
    registry.record(server.seed_hero("Autotest_Recorded"));
    server.seed_hero("Autotest_Orphan");

    let err = SuiteCleanup::new(client(&server), registry, PREFIX, config(CleanupMode::Registry, 30))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, E2eError::Cleanup(_)));
}

#[tokio::test]
async fn forced_cleanup_also_deletes_registered_unmarked_heroes() {
    let server = Arc::new(FakeServer::new(FakeBehaviour {
        delete_effective_every: 3,
        ..Default::default()
    }));
    let registry = CreatedRegistry::new();
    assert!(registry.is_empty());
    let unmarked = server.seed_hero("");
    registry.record(unmarked);
    let marked = server.seed_hero("Autotest_One");
    server.seed_hero("Clark Kent");

    let report = SuiteCleanup::new(client(&server), registry, PREFIX, config(CleanupMode::Forced, 30))
        .run()
        .await
        .unwrap();

    assert_eq!(report.targets, vec![unmarked, marked]);
    let ids: Vec<i64> = server.heroes().iter().map(|h| h.id).collect();
    assert!(!ids.contains(&unmarked) && !ids.contains(&marked), "{ids:?}");
    assert_eq!(ids.len(), 2);
}
