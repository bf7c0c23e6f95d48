mod common;

use common::*;
use depot_core::constants::MASTER_SNAPSHOT;
use depot_core::models::{ProjectData, VersionMismatch};
use depot_core::repository::VersionReconciler;
use depot_core::store::{NotificationQueue, ProjectStore};
use std::collections::BTreeSet;

fn fixture_repository() -> StubRepository {
    StubRepository::new()
        .with_versions("examples.alpha", "alpha", &["2.2.0", "2.3.0", "2.3.1"])
        .with_versions("examples.beta", "beta", &["1.0.0", "1.1.0"])
        .with_versions("examples.gamma", "gamma", &["3.0.0"])
        .with_versions("examples.delta", "delta", &["0.1.0"])
}

fn fixture_projects() -> Vec<ProjectData> {
    vec![
        ProjectData::new("PROD-A", "examples.alpha", "alpha").with_versions(["2.2.0", "2.3.0"]),
        // In sync
        ProjectData::new("PROD-B", "examples.beta", "beta").with_versions(["1.0.0", "1.1.0"]),
        // Stored version withdrawn upstream
        ProjectData::new("PROD-C", "examples.gamma", "gamma").with_versions(["2.9.0", "3.0.0"]),
        ProjectData::new("PROD-D", "examples.delta", "delta").with_versions(["0.1.0"]),
    ]
}

fn build(repository: StubRepository) -> TestDepot {
    fixture_projects()
        .into_iter()
        .fold(TestDepot::builder(repository), |builder, project| {
            builder.project(project)
        })
        .build()
}

fn reconciler(depot: &TestDepot) -> VersionReconciler {
    VersionReconciler::new(depot.projects.clone(), depot.repository.clone())
}

fn project_ids(mismatches: &[VersionMismatch]) -> BTreeSet<&str> {
    mismatches.iter().map(|m| m.project_id.as_str()).collect()
}

fn report<'a>(mismatches: &'a [VersionMismatch], project_id: &str) -> &'a VersionMismatch {
    mismatches
        .iter()
        .find(|m| m.project_id == project_id)
        .unwrap_or_else(|| panic!("no mismatch reported for {project_id}"))
}

#[tokio::test]
async fn test_reports_only_drifting_projects() {
    let depot = build(fixture_repository());

    let mismatches = reconciler(&depot).find_versions_mismatches().await.unwrap();
    assert_eq!(project_ids(&mismatches), BTreeSet::from(["PROD-A", "PROD-C"]));

    let alpha = report(&mismatches, "PROD-A");
    assert_eq!(alpha.versions_not_in_store, vec!["2.3.1".to_string()]);
    assert!(alpha.versions_not_in_repository.is_empty());
    assert!(alpha.errors.is_empty());

    let gamma = report(&mismatches, "PROD-C");
    assert!(gamma.versions_not_in_store.is_empty());
    assert_eq!(gamma.versions_not_in_repository, vec!["2.9.0".to_string()]);
}

#[tokio::test]
async fn test_repository_failure_is_reported_per_project() {
    let depot = build(fixture_repository().unavailable_for("examples.beta", "beta"));

    let mismatches = reconciler(&depot).find_versions_mismatches().await.unwrap();
    assert_eq!(
        project_ids(&mismatches),
        BTreeSet::from(["PROD-A", "PROD-B", "PROD-C"])
    );

    let beta = report(&mismatches, "PROD-B");
    assert_eq!(beta.errors.len(), 1);
    assert!(beta.errors[0].contains("unavailable"));
    assert!(beta.versions_not_in_store.is_empty());
    assert_eq!(
        report(&mismatches, "PROD-A").versions_not_in_store,
        vec!["2.3.1".to_string()]
    );
}

#[tokio::test]
async fn test_unknown_upstream_project_is_reported() {
    let repository = StubRepository::new()
        .with_versions("examples.alpha", "alpha", &["2.2.0", "2.3.0"])
        .with_versions("examples.beta", "beta", &["1.0.0", "1.1.0"])
        .with_versions("examples.gamma", "gamma", &["2.9.0", "3.0.0"]);
    let depot = build(repository);

    let mismatches = reconciler(&depot).find_versions_mismatches().await.unwrap();
    assert_eq!(project_ids(&mismatches), BTreeSet::from(["PROD-D"]));
    assert!(report(&mismatches, "PROD-D").errors[0].contains("not found"));
}

#[tokio::test]
async fn test_enqueue_missing_versions_notifies_each_gap() {
    let depot = build(
        fixture_repository()
            .with_versions("examples.beta", "beta", &["1.0.0", "1.1.0", "1.2.0", "1.3.0"])
            .unavailable_for("examples.delta", "delta"),
    );

    let event_ids = reconciler(&depot)
        .enqueue_missing_versions(&depot.manager)
        .await
        .unwrap();
    assert_eq!(event_ids.len(), 3);

    let mut queued: Vec<(String, String)> = depot
        .queue
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.project_id, e.version_id))
        .collect();
    queued.sort();
    assert_eq!(
        queued,
        vec![
            ("PROD-A".to_string(), "2.3.1".to_string()),
            ("PROD-B".to_string(), "1.2.0".to_string()),
            ("PROD-B".to_string(), "1.3.0".to_string()),
        ]
    );

    depot.manager.handle_all().await.unwrap();
    let after = reconciler(&depot).find_versions_mismatches().await.unwrap();
    assert_eq!(project_ids(&after), BTreeSet::from(["PROD-C", "PROD-D"]));
}

#[tokio::test]
async fn test_refreshed_snapshot_is_not_reported_as_drift() {
    let repository = StubRepository::new().with_versions(GROUP, ARTIFACT, &["1.0.0"]);
    let depot = TestDepot::builder(repository)
        .project(ProjectData::new(PROJECT, GROUP, ARTIFACT).with_versions(["1.0.0"]))
        .build();

    depot
        .manager
        .notify(PROJECT, GROUP, ARTIFACT, MASTER_SNAPSHOT)
        .await
        .unwrap();
    depot.manager.handle_all().await.unwrap();
    let stored = depot.projects.find(GROUP, ARTIFACT).await.unwrap().unwrap();
    assert!(stored.has_version(MASTER_SNAPSHOT));

    let mismatches = reconciler(&depot).find_versions_mismatches().await.unwrap();
    assert!(mismatches.is_empty(), "unexpected drift: {mismatches:?}");
}
