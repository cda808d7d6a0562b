//! Generate-or-fallback controller
//!
//! One invocation walks `ATTEMPT(1..=max_retries)` with exponential backoff
//! between attempts and ends in either `Generated` or `Fallback`. Nothing
//! about the walk is persisted; only the final prediction is written.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cache::PredictionCache;
use super::fallback::fallback_prediction;
use super::generator::{GenerationOutcome, PredictionGenerator};
use crate::config::PredictionConfig;
use crate::domain::{is_fallback, MatchRecord, PredictionSource, Score};
use crate::error::Result;

/// Attempt budget and backoff unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&PredictionConfig> for RetryPolicy {
    fn from(config: &PredictionConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            base_delay: config.backoff_base(),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (1-based): `2^attempt * base`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Why the controller did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A real (non-fallback) prediction is already cached
    AlreadyPredicted,
    /// At least one bracket slot has no team yet
    TeamsUnresolved,
}

/// Terminal state of one controller run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ControllerOutcome {
    Skipped { reason: SkipReason },
    Generated { score: Score, attempts: u32 },
    Fallback { score: Score, attempts: u32 },
}

#[derive(Clone)]
pub struct RetryController {
    cache: PredictionCache,
    generator: PredictionGenerator,
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(cache: PredictionCache, generator: PredictionGenerator, policy: RetryPolicy) -> Self {
        Self {
            cache,
            generator,
            policy,
        }
    }

    /// Entry guard: returns the reason to skip, if any
    pub fn skip_reason(record: &MatchRecord) -> Option<SkipReason> {
        let has_real_prediction = record.has_cached_prediction()
            && !is_fallback(record.ai_prediction_source, record.ai_prediction.as_deref());
        if has_real_prediction {
            return Some(SkipReason::AlreadyPredicted);
        }
        if !record.teams_known() {
            return Some(SkipReason::TeamsUnresolved);
        }
        None
    }

    /// Generate a prediction for a match, retrying with backoff and falling
    /// back to a random score. Only persistence and lookup errors escape.
    pub async fn generate_and_save(&self, match_id: Uuid) -> Result<ControllerOutcome> {
        let record = self.cache.load(match_id).await?;

        if let Some(reason) = Self::skip_reason(&record) {
            debug!(match_id = %match_id, ?reason, "skipping AI prediction");
            return Ok(ControllerOutcome::Skipped { reason });
        }

        let mut attempts = 0;
        for attempt in 1..=self.policy.max_retries {
            attempts = attempt;
            match self.generator.generate(&record).await {
                GenerationOutcome::Generated(prediction) => {
                    self.cache
                        .save(&record, &prediction, PredictionSource::Ai)
                        .await?;
                    info!(
                        match_id = %match_id,
                        score = %prediction.predicted_score,
                        attempt,
                        "AI prediction generated"
                    );
                    return Ok(ControllerOutcome::Generated {
                        score: prediction.predicted_score,
                        attempts: attempt,
                    });
                }
                GenerationOutcome::Failed(failure) if !failure.is_retryable() => {
                    warn!(match_id = %match_id, error = %failure, "AI unavailable, using fallback");
                    break;
                }
                GenerationOutcome::Failed(failure) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        match_id = %match_id,
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "AI prediction attempt failed"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let prediction = fallback_prediction(&record.phase, &mut rand::thread_rng());
        self.cache
            .save(&record, &prediction, PredictionSource::Fallback)
            .await?;
        warn!(
            match_id = %match_id,
            score = %prediction.predicted_score,
            attempts,
            "stored fallback prediction"
        );

        Ok(ControllerOutcome::Fallback {
            score: prediction.predicted_score,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryMatchStore;
    use crate::ai::{AiBackend, MockTextModel};
    use crate::domain::{AiPrediction, Confidence, Phase};
    use crate::error::PollaError;
    use crate::predictions::fallback::fallback_reasoning;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn controller(
        store: Arc<InMemoryMatchStore>,
        backend: AiBackend,
    ) -> RetryController {
        RetryController::new(
            PredictionCache::new(store),
            PredictionGenerator::new(backend),
            RetryPolicy::default(),
        )
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
    }

    #[test]
    fn test_skip_reason() {
        let mut record = MatchRecord::new(Uuid::new_v4(), "Peru", "Bolivia", Phase::Group, "WC2026");
        assert_eq!(RetryController::skip_reason(&record), None);

        record.ai_prediction = Some(
            serde_json::to_string(&AiPrediction {
                predicted_score: Score::new(1, 0),
                confidence: Confidence::Low,
                reasoning: fallback_reasoning(),
            })
            .unwrap(),
        );
        record.ai_prediction_score = Some("1-0".to_string());
        assert_eq!(RetryController::skip_reason(&record), None);

        record.ai_prediction_source = Some(PredictionSource::Ai);
        assert_eq!(
            RetryController::skip_reason(&record),
            Some(SkipReason::AlreadyPredicted)
        );

        let unresolved = MatchRecord::new(Uuid::new_v4(), "", "France", Phase::Semi, "WC2026");
        assert_eq!(
            RetryController::skip_reason(&unresolved),
            Some(SkipReason::TeamsUnresolved)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_with_backoff_then_succeeds() {
        let record = MatchRecord::new(Uuid::new_v4(), "Brasil", "Argentina", Phase::Group, "WC2026");
        let id = record.id;
        let store = Arc::new(InMemoryMatchStore::with_matches([record]));

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut model = MockTextModel::new();
        model.expect_generate_text().times(3).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(PollaError::AiRequest("rate limited".to_string()))
            } else {
                Ok(r#"{"predictedScore":"2-1","confidence":"high","reasoning":"Mejor plantilla"}"#.to_string())
            }
        });

        let controller = controller(store.clone(), AiBackend::available(Arc::new(model)));
        let started = tokio::time::Instant::now();
        let outcome = controller.generate_and_save(id).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(
            outcome,
            ControllerOutcome::Generated {
                score: Score::new(2, 1),
                attempts: 3
            }
        );
        assert!(elapsed >= Duration::from_secs(6));
        assert!(elapsed < Duration::from_secs(7));

        let saved = store.get(id).await.unwrap();
        assert_eq!(saved.ai_prediction_source, Some(PredictionSource::Ai));
        assert!(saved.ai_prediction.unwrap().contains("\"confidence\":\"high\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fall_back() {
        let record = MatchRecord::new(Uuid::new_v4(), "Francia", "España", Phase::Final, "WC2026");
        let id = record.id;
        let store = Arc::new(InMemoryMatchStore::with_matches([record]));

        let mut model = MockTextModel::new();
        model
            .expect_generate_text()
            .times(3)
            .returning(|_| Ok("no es JSON".to_string()));

        let controller = controller(store.clone(), AiBackend::available(Arc::new(model)));
        let started = tokio::time::Instant::now();
        let outcome = controller.generate_and_save(id).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(14));
        match outcome {
            ControllerOutcome::Fallback { score, attempts } => {
                assert_eq!(attempts, 3);
                assert!(!score.is_draw());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(
            store.get(id).await.unwrap().ai_prediction_source,
            Some(PredictionSource::Fallback)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_backend_falls_back_immediately() {
        let record = MatchRecord::new(Uuid::new_v4(), "Brasil", "Argentina", Phase::Group, "WC2026");
        let id = record.id;
        let store = Arc::new(InMemoryMatchStore::with_matches([record]));

        let controller = controller(store.clone(), AiBackend::unavailable("no key"));
        let started = tokio::time::Instant::now();
        let outcome = controller.generate_and_save(id).await.unwrap();

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(matches!(outcome, ControllerOutcome::Fallback { attempts: 1, .. }));
        assert_eq!(store.prediction_writes(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_teams_do_nothing() {
        let record = MatchRecord::new(Uuid::new_v4(), "", "France", Phase::Semi, "WC2026");
        let id = record.id;
        let store = Arc::new(InMemoryMatchStore::with_matches([record]));

        let mut model = MockTextModel::new();
        model.expect_generate_text().never();

        let controller = controller(store.clone(), AiBackend::available(Arc::new(model)));
        let outcome = controller.generate_and_save(id).await.unwrap();

        assert_eq!(
            outcome,
            ControllerOutcome::Skipped {
                reason: SkipReason::TeamsUnresolved
            }
        );
        assert_eq!(store.prediction_writes(), 0);
    }

    #[tokio::test]
    async fn test_unknown_match_propagates() {
        let store = Arc::new(InMemoryMatchStore::new());
        let controller = controller(store, AiBackend::unavailable("no key"));
        let err = controller.generate_and_save(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
