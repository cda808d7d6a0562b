use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::bulk::BulkResolver;
use super::cache::{PredictionCache, PredictionView};
use super::generator::PredictionGenerator;
use super::retry::{ControllerOutcome, RetryController, RetryPolicy};
use crate::adapters::MatchStore;
use crate::ai::AiBackend;
use crate::domain::is_known_team;
use crate::error::{PollaError, Result};

/// Entry point for every prediction operation
#[derive(Clone)]
pub struct PredictionService {
    cache: PredictionCache,
    generator: PredictionGenerator,
    controller: RetryController,
    bulk: BulkResolver,
}

impl PredictionService {
    pub fn new(store: Arc<dyn MatchStore>, backend: AiBackend, policy: RetryPolicy) -> Self {
        let cache = PredictionCache::new(store);
        let generator = PredictionGenerator::new(backend);
        let controller = RetryController::new(cache.clone(), generator.clone(), policy);
        let bulk = BulkResolver::new(cache.clone(), generator.clone());

        Self {
            cache,
            generator,
            controller,
            bulk,
        }
    }

    pub fn ai_available(&self) -> bool {
        self.generator.is_available()
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        self.cache.store()
    }

    pub fn controller(&self) -> &RetryController {
        &self.controller
    }

    pub async fn get_prediction(&self, match_id: Uuid) -> Result<PredictionView> {
        self.cache.read(match_id).await
    }

    pub async fn get_bulk_predictions<S: AsRef<str>>(
        &self,
        match_ids: &[S],
    ) -> Result<BTreeMap<Uuid, [u32; 2]>> {
        self.bulk.resolve(match_ids).await
    }

    pub async fn generate_and_save(&self, match_id: Uuid) -> Result<ControllerOutcome> {
        self.controller.generate_and_save(match_id).await
    }

    pub async fn clear_cache(&self, match_id: Uuid) -> Result<()> {
        self.cache.clear(match_id).await
    }

    /// Fill a bracket slot pair. The previous prediction belonged to another
    /// line-up, so it is dropped.
    pub async fn assign_teams(&self, match_id: Uuid, home_team: &str, away_team: &str) -> Result<()> {
        let (home_team, away_team) = (home_team.trim(), away_team.trim());
        if !is_known_team(home_team) || !is_known_team(away_team) {
            return Err(PollaError::InvalidTeams(format!(
                "both teams are required (home: '{}', away: '{}')",
                home_team, away_team
            )));
        }

        if !self
            .cache
            .store()
            .assign_teams(match_id, home_team, away_team)
            .await?
        {
            return Err(PollaError::match_not_found(match_id));
        }

        info!(match_id = %match_id, home = %home_team, away = %away_team, "teams assigned");
        Ok(())
    }
}
