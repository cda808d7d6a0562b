use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::events::ListenerStatsSnapshot;
use crate::predictions::ControllerOutcome;

// ============================================================================
// Prediction Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPredictionRequest {
    pub match_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkPredictionResponse {
    pub predictions: BTreeMap<Uuid, [u32; 2]>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheResponse {
    pub message: String,
    pub match_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub match_id: Uuid,
    pub outcome: ControllerOutcome,
}

// ============================================================================
// Match Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeamsRequest {
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeamsResponse {
    pub match_id: Uuid,
    pub event: &'static str,
    /// Listeners that received the event
    pub listeners: usize,
}

// ============================================================================
// System Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub db: String,
    pub ai: String,
    pub uptime_secs: i64,
    pub listener: ListenerStatsSnapshot,
}
