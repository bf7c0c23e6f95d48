mod common;

use common::*;
use depot_core::config::QueueManagerConfig;
use depot_core::constants::metrics::QUEUE_WAITING;
use depot_core::models::EventStatus;
use depot_core::orchestration::QueueScheduler;
use std::time::Duration;

#[tokio::test]
async fn test_scheduler_drains_queue_and_stops() {
    let config = QueueManagerConfig {
        queue_delay_ms: 0,
        queue_interval_ms: 5,
        metrics_interval_ms: 5,
        ..QueueManagerConfig::default()
    };
    let depot = TestDepot::builder(
        StubRepository::new().with_versions(GROUP, ARTIFACT, &["1.0.0", "1.1.0"]),
    )
    .queue_config(config.clone())
    .build();

    let first = depot
        .manager
        .notify(PROJECT, GROUP, ARTIFACT, "1.0.0")
        .await
        .unwrap();
    let second = depot
        .manager
        .notify(PROJECT, GROUP, ARTIFACT, "1.1.0")
        .await
        .unwrap();

    let handle = QueueScheduler::start(depot.manager.clone(), &config);

    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while depot.manager.waiting_on_queue().await.unwrap() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(drained.is_ok(), "scheduler did not drain the queue");

    handle.shutdown().await;

    for event_id in [first, second] {
        let processed = depot
            .manager
            .get_processed_event(&event_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(processed.status(), EventStatus::Success);
    }
    assert_eq!(depot.metrics.gauge(QUEUE_WAITING), Some(0));
}

#[tokio::test]
async fn test_shutdown_before_first_tick() {
    let config = QueueManagerConfig {
        queue_delay_ms: 60_000,
        ..QueueManagerConfig::default()
    };
    let depot = TestDepot::builder(StubRepository::new().with_versions(GROUP, ARTIFACT, &["1.0.0"]))
        .queue_config(config.clone())
        .build();
    depot
        .manager
        .notify(PROJECT, GROUP, ARTIFACT, "1.0.0")
        .await
        .unwrap();

    let handle = QueueScheduler::start(depot.manager.clone(), &config);
    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("shutdown should not wait for the initial delay");

    assert_eq!(depot.manager.waiting_on_queue().await.unwrap(), 1);
}
