//! In-process `MatchStore` used by tests and local runs without PostgreSQL.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{MatchStore, PredictionWrite};
use crate::domain::MatchRecord;
use crate::error::Result;

#[derive(Default)]
pub struct InMemoryMatchStore {
    matches: RwLock<HashMap<Uuid, MatchRecord>>,
    prediction_writes: AtomicU64,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches(matches: impl IntoIterator<Item = MatchRecord>) -> Self {
        let map = matches.into_iter().map(|m| (m.id, m)).collect();
        Self {
            matches: RwLock::new(map),
            prediction_writes: AtomicU64::new(0),
        }
    }

    pub async fn insert(&self, record: MatchRecord) {
        self.matches.write().await.insert(record.id, record);
    }

    pub async fn get(&self, id: Uuid) -> Option<MatchRecord> {
        self.matches.read().await.get(&id).cloned()
    }

    /// Number of `save_prediction` calls that hit an existing row
    pub fn prediction_writes(&self) -> u64 {
        self.prediction_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn find_match(&self, id: Uuid) -> Result<Option<MatchRecord>> {
        Ok(self.get(id).await)
    }

    async fn find_matches(&self, ids: &[Uuid]) -> Result<Vec<MatchRecord>> {
        // Same shape as `id = ANY($1)`: one row per match, however often it is asked for.
        let matches = self.matches.read().await;
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| matches.get(id).cloned())
            .collect())
    }

    async fn save_prediction(&self, id: Uuid, write: &PredictionWrite) -> Result<bool> {
        let mut matches = self.matches.write().await;
        let Some(record) = matches.get_mut(&id) else {
            return Ok(false);
        };

        record.ai_prediction = Some(write.prediction_json.clone());
        record.ai_prediction_score = Some(write.score.clone());
        record.ai_prediction_generated_at = Some(write.generated_at);
        record.ai_prediction_source = Some(write.source);
        self.prediction_writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn clear_prediction(&self, id: Uuid) -> Result<bool> {
        let mut matches = self.matches.write().await;
        match matches.get_mut(&id) {
            Some(record) => {
                record.clear_prediction();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn assign_teams(&self, id: Uuid, home_team: &str, away_team: &str) -> Result<bool> {
        let mut matches = self.matches.write().await;
        match matches.get_mut(&id) {
            Some(record) => {
                record.home_team = home_team.to_string();
                record.away_team = away_team.to_string();
                record.clear_prediction();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Phase, PredictionSource};
    use chrono::Utc;

    fn write() -> PredictionWrite {
        PredictionWrite {
            prediction_json: r#"{"predictedScore":"1-0"}"#.to_string(),
            score: "1-0".to_string(),
            generated_at: Utc::now(),
            source: PredictionSource::Ai,
        }
    }

    #[tokio::test]
    async fn test_save_and_clear() {
        let record = MatchRecord::new(Uuid::new_v4(), "Uruguay", "Chile", Phase::Group, "WC2026");
        let id = record.id;
        let store = InMemoryMatchStore::with_matches([record]);

        assert!(store.save_prediction(id, &write()).await.unwrap());
        assert_eq!(store.prediction_writes(), 1);
        assert_eq!(store.get(id).await.unwrap().ai_prediction_score.as_deref(), Some("1-0"));

        assert!(store.clear_prediction(id).await.unwrap());
        assert!(!store.get(id).await.unwrap().has_cached_prediction());
    }

    #[tokio::test]
    async fn test_find_matches_returns_each_row_once() {
        let record = MatchRecord::new(Uuid::new_v4(), "Perú", "Chile", Phase::Group, "WC2026");
        let id = record.id;
        let store = InMemoryMatchStore::with_matches([record]);

        let found = store.find_matches(&[id, Uuid::new_v4(), id]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[tokio::test]
    async fn test_unknown_id_is_reported() {
        let store = InMemoryMatchStore::new();
        assert!(!store.save_prediction(Uuid::new_v4(), &write()).await.unwrap());
        assert!(!store.clear_prediction(Uuid::new_v4()).await.unwrap());
        assert_eq!(store.prediction_writes(), 0);
    }

    #[tokio::test]
    async fn test_assign_teams_drops_old_prediction() {
        let record = MatchRecord::new(Uuid::new_v4(), "", "", Phase::Quarter, "WC2026");
        let id = record.id;
        let store = InMemoryMatchStore::with_matches([record]);
        store.save_prediction(id, &write()).await.unwrap();

        assert!(store.assign_teams(id, "Mexico", "Japan").await.unwrap());
        let updated = store.get(id).await.unwrap();
        assert!(updated.teams_known());
        assert!(!updated.has_cached_prediction());
    }
}
