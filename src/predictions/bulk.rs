use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cache::PredictionCache;
use super::fallback::fallback_prediction;
use super::generator::{GenerationOutcome, PredictionGenerator};
use crate::domain::{AiPrediction, MatchRecord, PredictionSource, Score};
use crate::error::Result;

/// Length of a canonical hyphenated UUID
pub const MATCH_ID_LEN: usize = 36;

/// Keep only well-formed match ids so the query never sees garbage.
/// Repeats are dropped, first occurrence wins.
pub fn parse_match_ids<S: AsRef<str>>(raw_ids: &[S]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    raw_ids
        .iter()
        .map(|raw| raw.as_ref().trim())
        .filter(|raw| raw.len() == MATCH_ID_LEN)
        .filter_map(|raw| Uuid::parse_str(raw).ok())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Resolves scores for many matches, generating on cache misses
#[derive(Clone)]
pub struct BulkResolver {
    cache: PredictionCache,
    generator: PredictionGenerator,
}

impl BulkResolver {
    pub fn new(cache: PredictionCache, generator: PredictionGenerator) -> Self {
        Self { cache, generator }
    }

    /// Score per match id. Ids that are malformed or unknown are left out.
    ///
    /// Matches are handled one at a time so a cold cache does not burst the
    /// model's rate limit.
    pub async fn resolve<S: AsRef<str>>(&self, raw_ids: &[S]) -> Result<BTreeMap<Uuid, [u32; 2]>> {
        let ids = parse_match_ids(raw_ids);
        if ids.len() < raw_ids.len() {
            debug!(
                dropped = raw_ids.len() - ids.len(),
                "ignoring malformed or repeated match ids"
            );
        }

        let matches = self.cache.store().find_matches(&ids).await?;
        let mut scores = BTreeMap::new();

        for record in &matches {
            let score = self.resolve_one(record).await?;
            scores.insert(record.id, score.as_pair());
        }

        Ok(scores)
    }

    async fn resolve_one(&self, record: &MatchRecord) -> Result<Score> {
        if let Some(score) = cached_score(record) {
            return Ok(score);
        }

        if !record.teams_known() {
            // Placeholder only; nothing is cached for an unresolved slot.
            return Ok(Score::new(0, 0));
        }

        let (prediction, source) = match self.generator.generate(record).await {
            GenerationOutcome::Generated(prediction) => (prediction, PredictionSource::Ai),
            GenerationOutcome::Failed(failure) => {
                warn!(match_id = %record.id, error = %failure, "bulk generation failed, using fallback");
                (fallback_for(record), PredictionSource::Fallback)
            }
        };

        self.cache.save(record, &prediction, source).await?;
        info!(match_id = %record.id, score = %prediction.predicted_score, source = %source, "bulk prediction cached");
        Ok(prediction.predicted_score)
    }
}

fn cached_score(record: &MatchRecord) -> Option<Score> {
    record
        .ai_prediction_score
        .as_deref()
        .and_then(|raw| raw.parse::<Score>().ok())
}

fn fallback_for(record: &MatchRecord) -> AiPrediction {
    fallback_prediction(&record.phase, &mut rand::thread_rng())
}
