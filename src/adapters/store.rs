use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{MatchRecord, PredictionSource};
use crate::error::Result;

/// Column values written by the cache writer
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionWrite {
    pub prediction_json: String,
    pub score: String,
    pub generated_at: DateTime<Utc>,
    pub source: PredictionSource,
}

/// Access to the match rows this service reads and updates
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_match(&self, id: Uuid) -> Result<Option<MatchRecord>>;

    /// Rows for the given ids, in no particular order; missing ids are skipped
    async fn find_matches(&self, ids: &[Uuid]) -> Result<Vec<MatchRecord>>;

    /// Overwrite the prediction columns. Returns false when the match does not exist.
    async fn save_prediction(&self, id: Uuid, write: &PredictionWrite) -> Result<bool>;

    /// Null every prediction column. Returns false when the match does not exist.
    async fn clear_prediction(&self, id: Uuid) -> Result<bool>;

    /// Fill both bracket slots and drop any prediction made for the old line-up
    async fn assign_teams(&self, id: Uuid, home_team: &str, away_team: &str) -> Result<bool>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<()>;
}
