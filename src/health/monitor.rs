//! Live health monitoring loop.
//!
//! Drives a cancellable probe-aggregate-publish cycle at a fixed interval.
//! Probing is strictly serialized: the next probe only starts after the
//! previous publish completes, so a slow endpoint skips ticks instead of
//! queueing them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use super::aggregate::{aggregate, HealthSnapshot, NodeHealthRecord, TierThresholds};
use super::probe::{ProbeError, Sampler};

/// Cooperative cancellation flag shared between the monitor loop and
/// whatever owns the user-facing interrupt (key handler, signal handler).
///
/// The loop checks it once per iteration; an in-flight probe is never
/// interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the monitor loop to stop after its current iteration.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Receives each aggregated snapshot as it is produced.
///
/// Implemented by the live terminal view; the monitor only calls it and
/// never owns terminal state.
pub trait SnapshotSink {
    fn publish(&mut self, snapshot: &HealthSnapshot) -> Result<()>;
}

/// Polls a bucket health endpoint and publishes aggregated snapshots.
#[derive(Debug)]
pub struct LiveMonitor<S: Sampler> {
    sampler: S,
    thresholds: TierThresholds,
    interval: Duration,
    /// Node set from the last successful probe, re-emitted as all-failure
    /// rows when a probe fails so the dashboard keeps showing coverage.
    last_records: Vec<NodeHealthRecord>,
}

impl<S: Sampler> LiveMonitor<S> {
    pub fn new(sampler: S, interval: Duration) -> Self {
        Self {
            sampler,
            thresholds: TierThresholds::default(),
            interval,
            last_records: Vec::new(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: TierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Probe once and return the aggregated snapshot.
    ///
    /// Unlike the live loop, a probe failure here is fatal.
    pub async fn snapshot(&self, url: &str) -> Result<HealthSnapshot, ProbeError> {
        let records = self.sampler.probe(url).await?;
        Ok(aggregate(records, url, &self.thresholds))
    }

    /// Run the polling loop until `cancel` is signaled.
    ///
    /// Probe failures degrade the snapshot instead of terminating the loop;
    /// consecutive failures get no special treatment (no backoff).
    pub async fn run<K: SnapshotSink>(
        &mut self,
        url: &str,
        sink: &mut K,
        cancel: &CancelSignal,
    ) -> Result<()> {
        loop {
            let snapshot = self.tick(url).await;
            sink.publish(&snapshot)?;

            if cancel.is_cancelled() {
                return Ok(());
            }
            tokio::time::sleep(self.interval).await;
            if cancel.is_cancelled() {
                return Ok(());
            }
        }
    }

    /// One probe-aggregate step; never fails.
    async fn tick(&mut self, url: &str) -> HealthSnapshot {
        match self.sampler.probe(url).await {
            Ok(records) => {
                debug!(nodes = records.len(), url, "health probe succeeded");
                self.last_records = records.clone();
                aggregate(records, url, &self.thresholds)
            }
            Err(e) => {
                warn!(error = %e, url, "health probe failed, publishing degraded snapshot");
                let degraded = self
                    .last_records
                    .iter()
                    .map(|r| NodeHealthRecord {
                        provider: r.provider.clone(),
                        region: r.region.clone(),
                        latency_ms: 0.0,
                        height: 0,
                    })
                    .collect();
                aggregate(degraded, url, &self.thresholds)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::health::aggregate::NodeStatus;

    /// Sampler that replays a scripted sequence of probe outcomes.
    struct ScriptedSampler {
        outcomes: Mutex<VecDeque<Result<Vec<NodeHealthRecord>, ProbeError>>>,
    }

    impl ScriptedSampler {
        fn new(outcomes: Vec<Result<Vec<NodeHealthRecord>, ProbeError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
            }
        }
    }

    impl Sampler for ScriptedSampler {
        async fn probe(&self, _url: &str) -> Result<Vec<NodeHealthRecord>, ProbeError> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProbeError::Timeout))
        }
    }

    /// Sink that records snapshots and cancels after a fixed count.
    struct CountingSink {
        snapshots: Vec<HealthSnapshot>,
        cancel_after: usize,
        cancel: CancelSignal,
    }

    impl SnapshotSink for CountingSink {
        fn publish(&mut self, snapshot: &HealthSnapshot) -> Result<()> {
            self.snapshots.push(snapshot.clone());
            if self.snapshots.len() >= self.cancel_after {
                self.cancel.cancel();
            }
            Ok(())
        }
    }

    fn record(provider: &str, region: &str, height: u64) -> NodeHealthRecord {
        NodeHealthRecord {
            provider: provider.to_string(),
            region: region.to_string(),
            latency_ms: 3.0,
            height,
        }
    }

    const URL: &str = "https://api.stateless.solutions/polygon/v1/b-1/health";

    #[tokio::test(start_paused = true)]
    async fn test_loop_publishes_until_cancelled() {
        let sampler = ScriptedSampler::new(vec![
            Ok(vec![record("A", "us", 100)]),
            Ok(vec![record("A", "us", 101)]),
            Ok(vec![record("A", "us", 102)]),
        ]);
        let mut monitor = LiveMonitor::new(sampler, Duration::from_millis(670));
        let cancel = CancelSignal::new();
        let mut sink = CountingSink {
            snapshots: Vec::new(),
            cancel_after: 3,
            cancel: cancel.clone(),
        };

        monitor.run(URL, &mut sink, &cancel).await.unwrap();

        assert_eq!(sink.snapshots.len(), 3);
        assert_eq!(sink.snapshots[2].height_max, 102);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_degrades_instead_of_stopping() {
        let sampler = ScriptedSampler::new(vec![
            Ok(vec![record("A", "us", 100), record("B", "eu", 99)]),
            Err(ProbeError::Status(502)),
            Ok(vec![record("A", "us", 103), record("B", "eu", 102)]),
        ]);
        let mut monitor = LiveMonitor::new(sampler, Duration::from_millis(670));
        let cancel = CancelSignal::new();
        let mut sink = CountingSink {
            snapshots: Vec::new(),
            cancel_after: 3,
            cancel: cancel.clone(),
        };

        monitor.run(URL, &mut sink, &cancel).await.unwrap();

        // Degraded snapshot keeps the last-seen node set, all failed.
        let degraded = &sink.snapshots[1];
        assert_eq!(degraded.rows.len(), 2);
        assert!(degraded
            .rows
            .iter()
            .all(|r| r.status == NodeStatus::Failure));
        assert_eq!(degraded.height_max, 0);

        // The loop recovers on the next tick.
        assert_eq!(sink.snapshots[2].height_max, 103);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_before_any_success_publishes_empty_snapshot() {
        let sampler = ScriptedSampler::new(vec![Err(ProbeError::Timeout)]);
        let mut monitor = LiveMonitor::new(sampler, Duration::from_millis(670));
        let cancel = CancelSignal::new();
        let mut sink = CountingSink {
            snapshots: Vec::new(),
            cancel_after: 1,
            cancel: cancel.clone(),
        };

        monitor.run(URL, &mut sink, &cancel).await.unwrap();

        assert_eq!(sink.snapshots.len(), 1);
        assert!(sink.snapshots[0].rows.is_empty());
    }

    #[tokio::test]
    async fn test_one_shot_snapshot() {
        let sampler = ScriptedSampler::new(vec![Ok(vec![record("A", "us", 100)])]);
        let monitor = LiveMonitor::new(sampler, Duration::ZERO);

        let snapshot = monitor.snapshot(URL).await.unwrap();
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.label, "Polygon - b-1");
    }

    #[tokio::test]
    async fn test_one_shot_probe_failure_is_fatal() {
        let sampler = ScriptedSampler::new(vec![Err(ProbeError::Status(500))]);
        let monitor = LiveMonitor::new(sampler, Duration::ZERO);

        let err = monitor.snapshot(URL).await.unwrap_err();
        assert!(matches!(err, ProbeError::Status(500)));
    }

    #[test]
    fn test_cancel_signal_is_shared() {
        let cancel = CancelSignal::new();
        let clone = cancel.clone();
        assert!(!cancel.is_cancelled());
        clone.cancel();
        assert!(cancel.is_cancelled());
    }
}
