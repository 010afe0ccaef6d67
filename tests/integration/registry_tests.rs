use anyhow::Result;
use board_relay::core::RetryPolicy;
use board_relay::{AccessToken, ConfigError, MonitorExit, RelayError};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use super::common::test_helpers::{registry, settings, token};
use super::common::{FakeBoard, RecordingNotifier, INTERVAL};

#[tokio::test(start_paused = true)]
async fn test_edit_bursts_notify_twice() -> Result<()> {
    // Initial snapshot A, then ticks A, B, B, A, A.
    let board = FakeBoard::scripted(
        "Roadmap",
        &[Some("A"), Some("A"), Some("B"), Some("B"), Some("A"), Some("A")],
    );
    let notifier = RecordingNotifier::new();
    let registry = registry(Arc::clone(&board), Arc::clone(&notifier), settings(8, RetryPolicy::none()));

    registry.start("b1", token(), 42).await?;
    sleep(INTERVAL * 5 + Duration::from_secs(1)).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|m| m.chat_id == 42));
    assert_eq!(
        sent[0].text,
        "On board Roadmap changes were made: https://miro.com/app/board/Roadmap="
    );

    let exit = registry.stop("b1").await?.wait().await;
    assert!(exit.is_stopped());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_idle_board_never_notifies() -> Result<()> {
    let board = FakeBoard::idle("Quiet");
    let notifier = RecordingNotifier::new();
    let registry = registry(Arc::clone(&board), Arc::clone(&notifier), settings(8, RetryPolicy::none()));

    registry.start("b1", token(), 1).await?;
    sleep(INTERVAL * 10 + Duration::from_secs(1)).await;

    assert_eq!(board.snapshot_calls(), 11);
    assert!(notifier.sent().is_empty());

    registry.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failures_skip_ticks() -> Result<()> {
    // A, B (editing), fail, fail, B (settled across the gap).
    let board = FakeBoard::scripted("Gaps", &[Some("A"), Some("B"), None, None, Some("B")]);
    let notifier = RecordingNotifier::new();
    let registry = registry(Arc::clone(&board), Arc::clone(&notifier), settings(8, RetryPolicy::none()));

    registry.start("b1", token(), 1).await?;
    sleep(INTERVAL * 4 + Duration::from_secs(1)).await;

    assert_eq!(notifier.sent().len(), 1);
    assert!(registry.is_monitoring("b1").await);
    assert_eq!(registry.metrics().fetch_failures_total.get(), 2);

    registry.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failed_initial_fetch_takes_baseline_later() -> Result<()> {
    // No baseline at start; B becomes the baseline, then C, C settles.
    let board = FakeBoard::scripted("Late", &[None, Some("B"), Some("C"), Some("C")]);
    let notifier = RecordingNotifier::new();
    let registry = registry(Arc::clone(&board), Arc::clone(&notifier), settings(8, RetryPolicy::none()));

    registry.start("b1", token(), 1).await?;
    sleep(INTERVAL + Duration::from_secs(1)).await;
    assert!(notifier.sent().is_empty());

    sleep(INTERVAL * 2).await;
    assert_eq!(notifier.sent().len(), 1);

    registry.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_second_start_keeps_first_task() -> Result<()> {
    let board = FakeBoard::idle("Roadmap");
    let notifier = RecordingNotifier::new();
    let registry = registry(Arc::clone(&board), Arc::clone(&notifier), settings(8, RetryPolicy::none()));

    registry.start("b1", token(), 1).await?;
    let err = registry.start("b1", token(), 2).await.unwrap_err();
    assert!(matches!(err, RelayError::AlreadyMonitoring { .. }));

    sleep(INTERVAL + Duration::from_secs(1)).await;

    // One task only: the initial fetch plus a single tick.
    assert_eq!(board.snapshot_calls(), 2);
    let statuses = registry.list().await;
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].chat_id, 1);

    registry.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_completes_within_one_interval() -> Result<()> {
    let board = FakeBoard::idle("Roadmap");
    let registry = registry(board, RecordingNotifier::new(), settings(8, RetryPolicy::none()));

    registry.start("b1", token(), 1).await?;
    sleep(Duration::from_secs(90)).await;

    let completion = registry.stop("b1").await?;
    assert_eq!(completion.info.name, "Roadmap");
    assert!(registry.list().await.is_empty());

    let exit = timeout(INTERVAL, completion.wait()).await?;
    assert!(exit.is_stopped());

    let again = registry.stop("b1").await;
    assert!(matches!(again, Err(RelayError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn test_stop_unknown_board_has_no_effect() -> Result<()> {
    let registry = registry(FakeBoard::idle("Roadmap"), RecordingNotifier::new(), settings(8, RetryPolicy::none()));

    let result = registry.stop("missing").await;
    assert!(matches!(result, Err(RelayError::NotFound { board_id }) if board_id == "missing"));
    assert_eq!(registry.active_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_start_with_missing_configuration() -> Result<()> {
    let board = FakeBoard::idle("Roadmap");
    let registry = registry(Arc::clone(&board), RecordingNotifier::new(), settings(8, RetryPolicy::none()));

    let err = registry.start("b1", AccessToken::new("   "), 1).await.unwrap_err();
    assert!(matches!(err, RelayError::Config(ConfigError::Missing { .. })));
    assert_eq!(registry.active_count().await, 0);
    assert_eq!(board.snapshot_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_board_is_not_registered() -> Result<()> {
    let registry = registry(FakeBoard::unreachable(), RecordingNotifier::new(), settings(8, RetryPolicy::none()));

    let err = registry.start("b1", token(), 1).await.unwrap_err();
    assert!(matches!(err, RelayError::Transport(_)));
    assert!(registry.info("b1").await.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_capacity_bounds_concurrent_monitors() -> Result<()> {
    let registry = registry(FakeBoard::idle("Roadmap"), RecordingNotifier::new(), settings(2, RetryPolicy::none()));

    registry.start("b1", token(), 1).await?;
    registry.start("b2", token(), 1).await?;
    let err = registry.start("b3", token(), 1).await.unwrap_err();
    assert!(matches!(err, RelayError::CapacityExceeded { limit: 2 }));
    assert_eq!(registry.metrics().active_monitors.get(), 2);

    registry.shutdown().await;
    assert_eq!(registry.metrics().active_monitors.get(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_delivery_failure_after_retries_drops_entry() -> Result<()> {
    let board = FakeBoard::scripted("Roadmap", &[Some("A"), Some("B"), Some("B")]);
    let notifier = RecordingNotifier::failing();
    let registry = registry(board, Arc::clone(&notifier), settings(8, RetryPolicy::default()));

    registry.start("b1", token(), 1).await?;
    sleep(INTERVAL * 2 + Duration::from_secs(60)).await;

    // One attempt plus three retries, then the task gives up.
    assert_eq!(notifier.attempts(), 4);
    assert!(!registry.is_monitoring("b1").await);
    assert_eq!(registry.metrics().delivery_failures_total.get(), 1);

    // The board can be monitored again afterwards.
    registry.start("b1", token(), 1).await?;
    registry.shutdown().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_awaits_every_task() -> Result<()> {
    let registry = registry(FakeBoard::idle("Roadmap"), RecordingNotifier::new(), settings(8, RetryPolicy::none()));
    for id in ["b1", "b2", "b3"] {
        registry.start(id, token(), 1).await?;
    }

    let exits = registry.shutdown().await;
    let mut ids: Vec<_> = exits.iter().map(|(id, _)| id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["b1", "b2", "b3"]);
    assert!(exits.iter().all(|(_, exit)| matches!(exit, MonitorExit::Stopped)));
    assert_eq!(registry.active_count().await, 0);
    Ok(())
}
