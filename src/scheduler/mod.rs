//! Fan-out scheduling of probe cycles.
//!
//! A cycle probes every configured endpoint concurrently on a bounded pool
//! of tasks and returns one [`StatusSnapshot`] per endpoint, in completion
//! order. Cycles never fail: a probe failure or a crashed task becomes an
//! `Offline` snapshot.

mod error;
mod types;

pub use error::SchedulerError;
pub use types::StatusSnapshot;

use crate::config::VigilConfig;
use crate::health::{
    ActiveOutcome, ActivityState, Endpoint, HealthState, MonitorConfig, ProbeError,
    ProbeExecutor, ProbeReport, RawOutcome,
};
use crate::history::RollingStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Number of workers for a cycle over `endpoint_count` endpoints.
pub fn pool_size(worker_cap: usize, endpoint_count: usize) -> usize {
    worker_cap.min(endpoint_count).max(1)
}

/// Runs probe cycles over a fixed endpoint list.
pub struct CycleScheduler {
    config: MonitorConfig,
    executor: Arc<ProbeExecutor>,
    store: Arc<RollingStore>,
    endpoints: Vec<Endpoint>,
    /// Serializes cycles so an overlapping trigger waits for the running one
    cycle_lock: Arc<Mutex<()>>,
}

impl CycleScheduler {
    pub fn new(
        config: MonitorConfig,
        executor: ProbeExecutor,
        store: Arc<RollingStore>,
        endpoints: Vec<Endpoint>,
    ) -> Self {
        Self {
            config,
            executor: Arc::new(executor),
            store,
            endpoints,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Resolve endpoints and build the HTTP client from a full config.
    pub fn from_config(config: &VigilConfig) -> Result<Self, SchedulerError> {
        let endpoints = config.resolve_endpoints()?;
        let executor = ProbeExecutor::new(&config.monitor)?;
        let store = Arc::new(RollingStore::new(config.history.clone()));

        let classifier = executor.classifier();
        tracing::info!(
            strategy = ?classifier.strategy(),
            latency_threshold_seconds = classifier.latency_threshold(),
            worker_cap = config.monitor.worker_cap,
            "Classifier configured"
        );

        for endpoint in &endpoints {
            tracing::info!(
                name = %endpoint.name,
                url = %endpoint.url,
                active = endpoint.active_check().is_some(),
                "Loaded endpoint from config"
            );
        }

        Ok(Self::new(config.monitor.clone(), executor, store, endpoints))
    }

    /// Default base URL endpoints are resolved against.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn store(&self) -> &Arc<RollingStore> {
        &self.store
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one cycle over the configured endpoints.
    pub async fn run_cycle(&self) -> Vec<StatusSnapshot> {
        self.run_cycle_for(&self.endpoints).await
    }

    /// Run one cycle over `endpoints`.
    ///
    /// Returns exactly one snapshot per endpoint once every task has
    /// finished, ordered by completion. The cycle runs on its own task, which
    /// holds the cycle lock; dropping the returned future does not cancel
    /// probes already in flight.
    pub async fn run_cycle_for(&self, endpoints: &[Endpoint]) -> Vec<StatusSnapshot> {
        let guard = Arc::clone(&self.cycle_lock).lock_owned().await;

        let cycle = self.cycle(endpoints);
        let cycle_id = crate::logging::generate_cycle_id();
        let span = tracing::info_span!("cycle", %cycle_id, endpoints = endpoints.len());

        let detached = cycle.clone();
        let handle = tokio::spawn(
            async move {
                let _guard = guard;
                detached.run().await
            }
            .instrument(span),
        );

        match handle.await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!(error = %e, "Cycle task did not complete");
                cycle.complete(Vec::new())
            }
        }
    }

    /// Capture what a cycle over `endpoints` needs, including each endpoint's
    /// record count before the cycle starts.
    fn cycle(&self, endpoints: &[Endpoint]) -> Cycle {
        let baseline: HashMap<String, u64> = endpoints
            .iter()
            .map(|e| (e.name.clone(), self.store.recorded(&e.name)))
            .collect();

        Cycle {
            worker_cap: self.config.worker_cap,
            executor: Arc::clone(&self.executor),
            store: Arc::clone(&self.store),
            endpoints: endpoints.into(),
            baseline: Arc::new(baseline),
        }
    }

    /// Run cycles on a timer until `cancel_token` fires.
    ///
    /// Cancellation is observed between cycles; a running cycle completes.
    pub fn start(self: Arc<Self>, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(self.config.interval_seconds.max(1)));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.config.interval_seconds,
                endpoints = self.endpoints.len(),
                "Background poller started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Background poller shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let snapshots = self.run_cycle().await;
                        tracing::debug!(
                            endpoints_checked = snapshots.len(),
                            "Background cycle completed"
                        );
                    }
                }
            }
        })
    }
}

/// One pass over a fixed endpoint list, owned by the task that runs it.
#[derive(Clone)]
struct Cycle {
    worker_cap: usize,
    executor: Arc<ProbeExecutor>,
    store: Arc<RollingStore>,
    endpoints: Arc<[Endpoint]>,
    /// `RollingStore::recorded` per endpoint when the cycle started
    baseline: Arc<HashMap<String, u64>>,
}

impl Cycle {
    async fn run(self) -> Vec<StatusSnapshot> {
        if self.endpoints.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let workers = pool_size(self.worker_cap, self.endpoints.len());
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for endpoint in self.endpoints.iter().cloned() {
            let permits = Arc::clone(&permits);
            let executor = Arc::clone(&self.executor);
            let store = Arc::clone(&self.store);

            tasks.spawn(
                async move {
                    // Held until the endpoint is fully processed
                    let _permit = permits.acquire_owned().await;
                    check_and_record(&executor, &store, &endpoint).await
                }
                .in_current_span(),
            );
        }

        let mut snapshots = Vec::with_capacity(self.endpoints.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => tracing::error!(error = %e, "Endpoint task did not complete"),
            }
        }

        let snapshots = self.complete(snapshots);

        let online = snapshots
            .iter()
            .filter(|s| s.status == HealthState::Online)
            .count();
        let elapsed = start.elapsed().as_secs_f64();

        metrics::histogram!("vigil_cycle_duration_seconds").record(elapsed);
        metrics::gauge!("vigil_endpoints_total").set(snapshots.len() as f64);
        metrics::gauge!("vigil_endpoints_online").set(online as f64);

        tracing::debug!(
            endpoints_checked = snapshots.len(),
            online,
            workers,
            elapsed_seconds = elapsed,
            "Cycle completed"
        );

        snapshots
    }

    /// Append a failure snapshot for every endpoint missing from `snapshots`.
    fn complete(&self, mut snapshots: Vec<StatusSnapshot>) -> Vec<StatusSnapshot> {
        if snapshots.len() >= self.endpoints.len() {
            return snapshots;
        }

        let missing: Vec<&Endpoint> = {
            let done: HashSet<&str> = snapshots.iter().map(|s| s.name.as_str()).collect();
            self.endpoints
                .iter()
                .filter(|e| !done.contains(e.name.as_str()))
                .collect()
        };
        let failures: Vec<StatusSnapshot> = missing
            .into_iter()
            .map(|endpoint| self.task_failure(endpoint))
            .collect();

        snapshots.extend(failures);
        snapshots
    }

    /// `Offline` snapshot for an endpoint whose task crashed.
    ///
    /// The failure is recorded only when the task died before recording its
    /// own sample, keeping one record per endpoint per cycle.
    fn task_failure(&self, endpoint: &Endpoint) -> StatusSnapshot {
        let outcome = RawOutcome::failed(
            ProbeError::Request("probe task aborted".to_string()),
            0.0,
        );
        let classification = self.executor.classifier().classify(&outcome);

        let before = self.baseline.get(&endpoint.name).copied().unwrap_or(0);
        if self.store.recorded(&endpoint.name) == before {
            self.store.record(&endpoint.name, &outcome, &classification);
        } else {
            tracing::debug!(
                endpoint = %endpoint.name,
                "Crashed task already recorded its sample"
            );
        }

        let report = ProbeReport {
            outcome,
            active: endpoint.active_check().map(|check| ActiveOutcome {
                state: ActivityState::Failing,
                note: "Not run: probe task aborted".to_string(),
                method: check.method,
                status_code: None,
            }),
            last_method: endpoint.passive_method(),
        };

        StatusSnapshot::build(endpoint, classification.state, &report, &self.store)
    }
}

/// Probe one endpoint, classify, record, and build its snapshot.
async fn check_and_record(
    executor: &ProbeExecutor,
    store: &RollingStore,
    endpoint: &Endpoint,
) -> StatusSnapshot {
    let report = executor.check_endpoint(endpoint).await;
    let classification = executor.classifier().classify(&report.outcome);
    store.record(&endpoint.name, &report.outcome, &classification);

    metrics::counter!("vigil_probes_total",
        "endpoint" => endpoint.name.clone(),
        "status" => classification.state.as_str()
    )
    .increment(1);

    if let Some(active) = &report.active {
        metrics::counter!("vigil_active_checks_total",
            "endpoint" => endpoint.name.clone(),
            "activity" => active.state.to_string()
        )
        .increment(1);
    }

    tracing::debug!(
        endpoint = %endpoint.name,
        status = %classification.state,
        status_code = report.outcome.status_code,
        elapsed_seconds = report.outcome.elapsed_seconds,
        "Endpoint checked"
    );

    StatusSnapshot::build(endpoint, classification.state, &report, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Severity;

    fn unreachable_endpoints(n: usize) -> Vec<Endpoint> {
        // Port 1 on loopback refuses connections
        (0..n)
            .map(|i| Endpoint::passive(format!("ep-{}", i), "http://127.0.0.1:1/health"))
            .collect()
    }

    fn scheduler(endpoints: Vec<Endpoint>) -> CycleScheduler {
        let config = MonitorConfig {
            timeout_seconds: 1,
            worker_cap: 3,
            ..Default::default()
        };
        let executor = ProbeExecutor::with_client(&config, reqwest::Client::new());
        CycleScheduler::new(
            config,
            executor,
            Arc::new(RollingStore::default()),
            endpoints,
        )
    }

    #[test]
    fn test_pool_size_bounds() {
        assert_eq!(pool_size(8, 3), 3);
        assert_eq!(pool_size(8, 20), 8);
        assert_eq!(pool_size(8, 0), 1);
        assert_eq!(pool_size(0, 5), 1);
    }

    #[tokio::test]
    async fn test_empty_cycle_returns_nothing() {
        let scheduler = scheduler(vec![]);
        assert!(scheduler.run_cycle().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_failures_still_yield_one_snapshot_each() {
        let scheduler = scheduler(unreachable_endpoints(7));
        let snapshots = scheduler.run_cycle().await;

        assert_eq!(snapshots.len(), 7);
        let names: HashSet<&str> = snapshots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), 7);
        for snapshot in &snapshots {
            assert_eq!(snapshot.status, HealthState::Offline);
            assert_eq!(snapshot.status_code, 0);
            assert_eq!(snapshot.uptime, 0.0);
            assert_eq!(snapshot.logs.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_task_failure_snapshot_is_offline() {
        let scheduler = scheduler(unreachable_endpoints(1));
        let endpoint = scheduler.endpoints()[0].clone();
        let cycle = scheduler.cycle(scheduler.endpoints());

        let snapshot = cycle.task_failure(&endpoint);
        assert_eq!(snapshot.status, HealthState::Offline);
        assert!(snapshot.logs[0].message.contains("probe task aborted"));
        assert_eq!(scheduler.store().sample_count(&endpoint.name), 1);
    }

    #[tokio::test]
    async fn test_task_failure_after_record_is_not_recorded_twice() {
        let scheduler = scheduler(unreachable_endpoints(1));
        let endpoint = scheduler.endpoints()[0].clone();
        let cycle = scheduler.cycle(scheduler.endpoints());

        // The task recorded its sample, then died before returning
        let outcome = RawOutcome::response(200, 0.1);
        let classification = scheduler.executor.classifier().classify(&outcome);
        scheduler
            .store()
            .record(&endpoint.name, &outcome, &classification);

        let snapshot = cycle.task_failure(&endpoint);
        assert_eq!(snapshot.status, HealthState::Offline);
        assert_eq!(scheduler.store().recorded(&endpoint.name), 1);
        assert_eq!(snapshot.success_history, vec![true]);
        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(snapshot.logs[0].level, Severity::Info);
    }

    #[tokio::test]
    async fn test_complete_backfills_only_missing_endpoints() {
        let scheduler = scheduler(unreachable_endpoints(3));
        let cycle = scheduler.cycle(scheduler.endpoints());

        let first = cycle.task_failure(&scheduler.endpoints()[0]);
        let snapshots = cycle.complete(vec![first]);

        assert_eq!(snapshots.len(), 3);
        let names: HashSet<&str> = snapshots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), 3);
        for name in ["ep-0", "ep-1", "ep-2"] {
            assert_eq!(scheduler.store().recorded(name), 1);
        }
    }

    #[tokio::test]
    async fn test_background_poller_stops_on_cancel() {
        let scheduler = Arc::new(scheduler(unreachable_endpoints(1)));
        let cancel = CancellationToken::new();
        let handle = Arc::clone(&scheduler).start(cancel.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(3), handle).await;
        assert!(result.is_ok());
        // First tick fires immediately
        assert_eq!(scheduler.store().sample_count("ep-0"), 1);
    }
}
