//! Tests for the Dispatcher module

use super::aggregator::aggregate_worker_stats;
use super::builder::DispatcherBuilder;
use super::collector::OutcomeCollector;
use crate::channel::ChannelConfig;
use crate::config::BenchmarkConfig;
use crate::error::{BenchErrorCategory, ErrorKind};
use crate::request::WorkItem;
use crate::response::RequestOutcome;
use crate::test_support::{FixedSampler, Script, ScriptedIssuer};
use crate::worker::WorkerStats;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn dispatcher_for(
    issuer: Arc<ScriptedIssuer>,
    config: BenchmarkConfig,
) -> super::executor::Dispatcher {
    DispatcherBuilder::new()
        .config(config)
        .issuer(issuer)
        .sampler(Arc::new(FixedSampler::new("Test prompt")))
        .build()
        .unwrap()
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_builder_missing_issuer() {
    let err = DispatcherBuilder::new()
        .sampler(Arc::new(FixedSampler::new("p")))
        .build()
        .unwrap_err();
    assert!(err.message.contains("issuer"));
}

#[test]
fn test_builder_missing_sampler() {
    let err = DispatcherBuilder::new()
        .issuer(Arc::new(ScriptedIssuer::uniform(1, Duration::from_millis(1))))
        .build()
        .unwrap_err();
    assert!(err.message.contains("sampler"));
}

#[test]
fn test_builder_rejects_zero_concurrency() {
    let err = DispatcherBuilder::new()
        .concurrency(0)
        .issuer(Arc::new(ScriptedIssuer::uniform(1, Duration::from_millis(1))))
        .sampler(Arc::new(FixedSampler::new("p")))
        .build()
        .unwrap_err();
    assert_eq!(err.category, BenchErrorCategory::Config);
}

#[test]
fn test_builder_overrides() {
    let dispatcher = DispatcherBuilder::new()
        .request_count(7)
        .concurrency(3)
        .channel_config(ChannelConfig::default().with_outcome_buffer(2))
        .issuer(Arc::new(ScriptedIssuer::uniform(1, Duration::from_millis(1))))
        .sampler(Arc::new(FixedSampler::new("p")))
        .build()
        .unwrap();
    assert_eq!(dispatcher.config().request_count, 7);
    assert_eq!(dispatcher.config().concurrency, 3);
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_sequential_run_rates() {
    // 10 requests, concurrency 1, each streams 2 units over 100ms
    let issuer = Arc::new(ScriptedIssuer::uniform(2, Duration::from_millis(100)));
    let dispatcher = dispatcher_for(issuer.clone(), BenchmarkConfig::new(10, 1));

    let result = dispatcher.run_and_summarize().await.unwrap();

    assert_eq!(result.total_requests, 10);
    assert_eq!(result.successful_requests, 10);
    assert_eq!(result.failed_requests, 0);
    assert!((result.requests_per_second - 10.0).abs() < 0.5);
    assert!((result.latency.average.unwrap() - 0.1).abs() < 0.01);
    assert_eq!(result.total_output_tokens, 20);
    assert_eq!(issuer.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_one_hanging_request_times_out() {
    // 5 requests at concurrency 5; work item 2 never completes
    let issuer = Arc::new(ScriptedIssuer::new(|request, _| {
        if request.work_item == WorkItem(2) {
            Script::Hang
        } else {
            Script::stream(2, Duration::from_millis(100))
        }
    }));
    let config = BenchmarkConfig::new(5, 5).with_request_timeout(Duration::from_secs(1));
    let dispatcher = dispatcher_for(issuer, config);

    let run = dispatcher.run().await.unwrap();
    let result = run.summarize(dispatcher.config());

    assert_eq!(result.successful_requests, 4);
    assert_eq!(result.failed_requests, 1);
    assert_eq!(result.error_statistics.count[&ErrorKind::Timeout], 1);

    let timed_out: Vec<&RequestOutcome> =
        run.outcomes.iter().filter(|o| !o.is_success()).collect();
    assert_eq!(timed_out.len(), 1);
    assert_eq!(timed_out[0].work_item, WorkItem(2));
    assert!(run.elapsed >= Duration::from_secs(1));
    assert!(run.elapsed < Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_never_exceeds_concurrency() {
    let issuer = Arc::new(ScriptedIssuer::new(|_, i| {
        Script::stream(3, Duration::from_millis(20 + (i as u64 % 7) * 10))
    }));
    let dispatcher = dispatcher_for(issuer.clone(), BenchmarkConfig::new(60, 4));

    let run = dispatcher.run().await.unwrap();

    assert_eq!(run.outcomes.len(), 60);
    assert!(issuer.max_in_flight() <= 4);
    assert_eq!(issuer.max_in_flight(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_outcome_count_matches_request_count() {
    for (requests, concurrency) in [(0, 1), (1, 1), (3, 8), (25, 5), (31, 4)] {
        let issuer = Arc::new(ScriptedIssuer::new(|_, i| {
            if i % 3 == 0 {
                Script::fail(500, "internal error")
            } else {
                Script::stream(1, Duration::from_millis(10))
            }
        }));
        let dispatcher =
            dispatcher_for(issuer.clone(), BenchmarkConfig::new(requests, concurrency));

        let run = dispatcher.run().await.unwrap();

        assert_eq!(run.outcomes.len(), requests);
        assert_eq!(issuer.call_count(), requests);
        let unique: HashSet<WorkItem> = run.outcomes.iter().map(|o| o.work_item).collect();
        assert_eq!(unique.len(), requests);
        assert_eq!(
            run.worker_stats.total_completed + run.worker_stats.total_errors,
            requests
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_all_failures_still_complete() {
    let issuer = Arc::new(ScriptedIssuer::new(|_, _| Script::fail(401, "Unauthorized")));
    let dispatcher = dispatcher_for(issuer, BenchmarkConfig::new(6, 3));

    let result = dispatcher.run_and_summarize().await.unwrap();

    assert_eq!(result.failed_requests, 6);
    assert_eq!(result.error_statistics.count[&ErrorKind::AuthError], 6);
    assert_eq!(
        result.error_statistics.samples[&ErrorKind::AuthError].len(),
        1
    );
    assert!(result.latency.is_empty());
    assert_eq!(result.requests_per_second, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_small_outcome_buffer_does_not_stall() {
    let issuer = Arc::new(ScriptedIssuer::uniform(1, Duration::from_millis(5)));
    let dispatcher = DispatcherBuilder::new()
        .config(BenchmarkConfig::new(40, 8))
        .channel_config(ChannelConfig::default().with_outcome_buffer(1))
        .issuer(issuer)
        .sampler(Arc::new(FixedSampler::new("p")))
        .build()
        .unwrap();

    let run = dispatcher.run().await.unwrap();
    assert_eq!(run.outcomes.len(), 40);
}

#[tokio::test(start_paused = true)]
async fn test_zero_outcome_buffer_runs_with_capacity_one() {
    let channel_config = ChannelConfig::default().with_outcome_buffer(0);
    assert_eq!(channel_config.outcome_buffer(), 1);

    let dispatcher = DispatcherBuilder::new()
        .config(BenchmarkConfig::new(5, 2))
        .channel_config(channel_config)
        .issuer(Arc::new(ScriptedIssuer::uniform(1, Duration::from_millis(5))))
        .sampler(Arc::new(FixedSampler::new("p")))
        .build()
        .unwrap();

    let run = dispatcher.run().await.unwrap();
    assert_eq!(run.outcomes.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_dispatcher_is_reusable() {
    let issuer = Arc::new(ScriptedIssuer::uniform(1, Duration::from_millis(5)));
    let dispatcher = dispatcher_for(issuer.clone(), BenchmarkConfig::new(4, 2));

    dispatcher.run().await.unwrap();
    let second = dispatcher.run().await.unwrap();

    assert_eq!(second.outcomes.len(), 4);
    assert_eq!(issuer.call_count(), 8);
}

// ============================================================================
// Collector and aggregation
// ============================================================================

#[tokio::test]
async fn test_collector_drains_until_senders_drop() {
    let (tx, rx) = mpsc::channel(2);
    let handle = OutcomeCollector::spawn(rx, 3);

    for i in 0..3 {
        let outcome = if i == 1 {
            RequestOutcome::failure(WorkItem(i), ErrorKind::ApiError, Duration::ZERO, "x")
        } else {
            RequestOutcome::success(WorkItem(i), Duration::from_millis(1), None, 1)
        };
        tx.send(outcome).await.unwrap();
    }
    drop(tx);

    let collector = handle.await.unwrap();
    assert_eq!(collector.len(), 3);
    assert_eq!(collector.successes(), 2);
    assert_eq!(collector.into_outcomes().len(), 3);
}

#[test]
fn test_aggregate_worker_stats() {
    let mut a = WorkerStats::new();
    a.record_success(10);
    a.record_success(5);
    let mut b = WorkerStats::new();
    b.record_success(3);
    b.record_error();

    let aggregated = aggregate_worker_stats(&[a, b]);

    assert_eq!(aggregated.total_workers, 2);
    assert_eq!(aggregated.total_completed, 3);
    assert_eq!(aggregated.total_errors, 1);
    assert_eq!(aggregated.total_output_tokens, 18);
}

#[test]
fn test_aggregate_empty_stats() {
    let aggregated = aggregate_worker_stats(&[]);
    assert_eq!(aggregated.total_workers, 0);
    assert_eq!(aggregated.total_completed, 0);
    assert_eq!(aggregated.total_errors, 0);
}
