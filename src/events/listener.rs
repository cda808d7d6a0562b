//! Delayed trigger for `match.teams.assigned`
//!
//! Each event waits a random jitter before running the retry controller so a
//! batch of bracket updates does not hit the model all at once. Every event is
//! handled in its own task inside a `JoinSet`; the supervising loop logs and
//! counts failures and panics instead of letting them vanish.

use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::bus::MatchEvent;
use crate::config::PredictionConfig;
use crate::error::Result;
use crate::predictions::{ControllerOutcome, RetryController};

/// Half-open delay window `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterRange {
    pub min: Duration,
    pub max: Duration,
}

impl Default for JitterRange {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(5_000),
            max: Duration::from_millis(15_000),
        }
    }
}

impl From<&PredictionConfig> for JitterRange {
    fn from(config: &PredictionConfig) -> Self {
        Self {
            min: Duration::from_millis(config.jitter_min_ms),
            max: Duration::from_millis(config.jitter_max_ms),
        }
    }
}

impl JitterRange {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rng.gen_range(min..max))
    }
}

/// Counters exposed on the health endpoint
#[derive(Debug, Default)]
pub struct ListenerStats {
    received: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    lagged: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerStatsSnapshot {
    pub received: u64,
    pub completed: u64,
    pub failed: u64,
    pub lagged: u64,
    pub in_flight: u64,
}

impl ListenerStats {
    pub fn snapshot(&self) -> ListenerStatsSnapshot {
        let received = self.received.load(Ordering::Relaxed);
        let completed = self.completed.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        ListenerStatsSnapshot {
            received,
            completed,
            failed,
            lagged: self.lagged.load(Ordering::Relaxed),
            in_flight: received.saturating_sub(completed + failed),
        }
    }
}

pub struct TeamsAssignedListener {
    controller: RetryController,
    jitter: JitterRange,
    stats: Arc<ListenerStats>,
}

impl TeamsAssignedListener {
    pub fn new(controller: RetryController, jitter: JitterRange) -> Self {
        Self {
            controller,
            jitter,
            stats: Arc::new(ListenerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<ListenerStats> {
        Arc::clone(&self.stats)
    }

    /// Consume events until the bus closes, then wait for in-flight tasks
    pub fn spawn(self, mut rx: broadcast::Receiver<MatchEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut tasks: JoinSet<(Uuid, Result<ControllerOutcome>)> = JoinSet::new();
            info!("teams-assigned listener started");

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Ok(event) => self.dispatch(&mut tasks, event),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            self.stats.lagged.fetch_add(n, Ordering::Relaxed);
                            warn!(lagged = n, "teams-assigned listener lagged, events skipped");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("event bus closed, draining prediction tasks");
                            break;
                        }
                    },
                    Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                        self.record(joined);
                    }
                }
            }

            while let Some(joined) = tasks.join_next().await {
                self.record(joined);
            }
        })
    }

    fn dispatch(
        &self,
        tasks: &mut JoinSet<(Uuid, Result<ControllerOutcome>)>,
        event: MatchEvent,
    ) {
        match event {
            MatchEvent::TeamsAssigned {
                match_id,
                home_team,
                away_team,
            } => {
                self.stats.received.fetch_add(1, Ordering::Relaxed);
                let delay = self.jitter.sample(&mut rand::thread_rng());
                debug!(
                    match_id = %match_id,
                    home = %home_team,
                    away = %away_team,
                    delay_ms = delay.as_millis() as u64,
                    "scheduling AI prediction"
                );

                let controller = self.controller.clone();
                tasks.spawn(async move {
                    tokio::time::sleep(delay).await;
                    (match_id, controller.generate_and_save(match_id).await)
                });
            }
        }
    }

    fn record(
        &self,
        joined: std::result::Result<(Uuid, Result<ControllerOutcome>), tokio::task::JoinError>,
    ) {
        match joined {
            Ok((match_id, Ok(outcome))) => {
                self.stats.completed.fetch_add(1, Ordering::Relaxed);
                info!(match_id = %match_id, ?outcome, "teams-assigned prediction finished");
            }
            Ok((match_id, Err(e))) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(match_id = %match_id, error = %e, "teams-assigned prediction failed");
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "teams-assigned prediction task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryMatchStore, MatchStore, PredictionWrite};
    use crate::ai::AiBackend;
    use crate::domain::{MatchRecord, Phase, PredictionSource};
    use crate::events::EventBus;
    use crate::predictions::{PredictionCache, PredictionGenerator, RetryPolicy};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Store whose reads blow up, to exercise the panic branch
    struct PanickingStore;

    #[async_trait]
    impl MatchStore for PanickingStore {
        async fn find_match(&self, _id: Uuid) -> Result<Option<MatchRecord>> {
            panic!("storage exploded");
        }

        async fn find_matches(&self, _ids: &[Uuid]) -> Result<Vec<MatchRecord>> {
            Ok(Vec::new())
        }

        async fn save_prediction(&self, _id: Uuid, _write: &PredictionWrite) -> Result<bool> {
            Ok(false)
        }

        async fn clear_prediction(&self, _id: Uuid) -> Result<bool> {
            Ok(false)
        }

        async fn assign_teams(&self, _id: Uuid, _home: &str, _away: &str) -> Result<bool> {
            Ok(false)
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    fn listener(store: Arc<dyn MatchStore>) -> TeamsAssignedListener {
        let controller = RetryController::new(
            PredictionCache::new(store),
            PredictionGenerator::new(AiBackend::unavailable("no key")),
            RetryPolicy::default(),
        );
        TeamsAssignedListener::new(
            controller,
            JitterRange {
                min: Duration::from_secs(1),
                max: Duration::from_secs(2),
            },
        )
    }

    fn teams_assigned(match_id: Uuid) -> MatchEvent {
        MatchEvent::TeamsAssigned {
            match_id,
            home_team: "Francia".to_string(),
            away_team: "España".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_is_counted_as_completed() {
        let record = MatchRecord::new(Uuid::new_v4(), "Francia", "España", Phase::Semi, "WC2026");
        let id = record.id;
        let store = Arc::new(InMemoryMatchStore::with_matches([record]));
        let bus = EventBus::new(4);
        let listener = listener(store.clone());
        let stats = listener.stats();
        let handle = listener.spawn(bus.subscribe());

        assert_eq!(bus.publish(teams_assigned(id)), 1);
        tokio::time::sleep(Duration::from_secs(3)).await;

        drop(bus);
        handle.await.unwrap();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.received, 1);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.failed, 0);
        assert_eq!(
            store.get(id).await.unwrap().ai_prediction_source,
            Some(PredictionSource::Fallback)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_prediction_is_counted_and_contained() {
        let bus = EventBus::new(4);
        let listener = listener(Arc::new(InMemoryMatchStore::new()));
        let stats = listener.stats();
        let handle = listener.spawn(bus.subscribe());

        assert_eq!(bus.publish(teams_assigned(Uuid::new_v4())), 1);
        tokio::time::sleep(Duration::from_secs(3)).await;

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.received, 1);
        assert_eq!(snapshot.completed, 0);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.in_flight, 0);

        drop(bus);
        assert!(handle.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_is_counted_as_failed() {
        let bus = EventBus::new(4);
        let listener = listener(Arc::new(PanickingStore));
        let stats = listener.stats();
        let handle = listener.spawn(bus.subscribe());

        bus.publish(teams_assigned(Uuid::new_v4()));
        tokio::time::sleep(Duration::from_secs(3)).await;

        // The listener survives and keeps consuming.
        bus.publish(teams_assigned(Uuid::new_v4()));
        tokio::time::sleep(Duration::from_secs(3)).await;

        drop(bus);
        assert!(handle.await.is_ok());

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.received, 2);
        assert_eq!(snapshot.failed, 2);
        assert_eq!(snapshot.completed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagged_events_are_counted() {
        let bus = EventBus::new(1);
        let listener = listener(Arc::new(InMemoryMatchStore::new()));
        let stats = listener.stats();
        let handle = listener.spawn(bus.subscribe());

        // The listener task has not run yet, so the one-slot buffer overflows.
        for _ in 0..3 {
            bus.publish(teams_assigned(Uuid::new_v4()));
        }
        tokio::time::sleep(Duration::from_secs(3)).await;

        drop(bus);
        assert!(handle.await.is_ok());

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.lagged, 2);
        assert_eq!(snapshot.received, 1);
        assert_eq!(snapshot.failed, 1);
    }

    #[test]
    fn test_jitter_stays_in_window() {
        let jitter = JitterRange::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let delay = jitter.sample(&mut rng);
            assert!(delay >= Duration::from_secs(5));
            assert!(delay < Duration::from_secs(15));
        }
    }

    #[test]
    fn test_degenerate_window_uses_min() {
        let jitter = JitterRange {
            min: Duration::from_millis(10),
            max: Duration::from_millis(10),
        };
        assert_eq!(
            jitter.sample(&mut StdRng::seed_from_u64(0)),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn test_in_flight_is_derived() {
        let stats = ListenerStats::default();
        stats.received.store(5, Ordering::Relaxed);
        stats.completed.store(3, Ordering::Relaxed);
        stats.failed.store(1, Ordering::Relaxed);
        assert_eq!(stats.snapshot().in_flight, 1);
    }
}
