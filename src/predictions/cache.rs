use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::{MatchStore, PredictionWrite};
use crate::domain::{AiPrediction, Confidence, MatchRecord, PredictionSource};
use crate::error::{PollaError, Result};

pub const PENDING_SCORE: &str = "?-?";

/// Analysis block returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionAnalysis {
    pub predicted_score: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Cached-or-pending prediction for one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionView {
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<bool>,
    pub score: String,
    pub analysis: PredictionAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl PredictionView {
    pub fn pending() -> Self {
        Self {
            cached: false,
            pending: Some(true),
            score: PENDING_SCORE.to_string(),
            analysis: PredictionAnalysis {
                predicted_score: PENDING_SCORE.to_string(),
                confidence: Some(Confidence::Pending),
                reasoning: None,
            },
            generated_at: None,
        }
    }

    /// View of a match row; malformed stored JSON degrades to a score-only analysis.
    pub fn from_record(record: &MatchRecord) -> Self {
        let Some(score) = record.ai_prediction_score.clone() else {
            return Self::pending();
        };

        let parsed = record
            .ai_prediction
            .as_deref()
            .ok_or_else(|| "prediction column is empty".to_string())
            .and_then(|raw| serde_json::from_str::<AiPrediction>(raw).map_err(|e| e.to_string()));

        let analysis = match parsed {
            Ok(prediction) => PredictionAnalysis {
                predicted_score: prediction.predicted_score.to_string(),
                confidence: Some(prediction.confidence),
                reasoning: Some(prediction.reasoning),
            },
            Err(e) => {
                warn!(match_id = %record.id, error = %e, "stored AI prediction is not valid JSON");
                PredictionAnalysis {
                    predicted_score: score.clone(),
                    confidence: None,
                    reasoning: None,
                }
            }
        };

        Self {
            cached: true,
            pending: None,
            score,
            analysis,
            generated_at: record.ai_prediction_generated_at,
        }
    }
}

/// Reads and writes the prediction columns of match rows
#[derive(Clone)]
pub struct PredictionCache {
    store: Arc<dyn MatchStore>,
}

impl PredictionCache {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    pub async fn load(&self, match_id: Uuid) -> Result<MatchRecord> {
        self.store
            .find_match(match_id)
            .await?
            .ok_or_else(|| PollaError::match_not_found(match_id))
    }

    /// Cached prediction or a pending placeholder. Read-only.
    pub async fn read(&self, match_id: Uuid) -> Result<PredictionView> {
        let record = self.load(match_id).await?;
        Ok(PredictionView::from_record(&record))
    }

    /// Unconditional overwrite of the cache columns (last write wins)
    pub async fn save(
        &self,
        record: &MatchRecord,
        prediction: &AiPrediction,
        source: PredictionSource,
    ) -> Result<()> {
        let write = PredictionWrite {
            prediction_json: serde_json::to_string(prediction)?,
            score: prediction.predicted_score.to_string(),
            generated_at: Utc::now(),
            source,
        };

        if !self.store.save_prediction(record.id, &write).await? {
            return Err(PollaError::match_not_found(record.id));
        }

        debug!(match_id = %record.id, score = %write.score, source = %source, "prediction cached");
        Ok(())
    }

    /// Null the cache columns so the next read or resolve regenerates
    pub async fn clear(&self, match_id: Uuid) -> Result<()> {
        if !self.store.clear_prediction(match_id).await? {
            return Err(PollaError::match_not_found(match_id));
        }
        info!(match_id = %match_id, "AI prediction cache cleared");
        Ok(())
    }
}
