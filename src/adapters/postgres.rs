use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::store::{MatchStore, PredictionWrite};
use crate::domain::{MatchRecord, Phase, PredictionSource};
use crate::error::Result;

const MATCH_COLUMNS: &str = r#"
    id, home_team, away_team, phase, tournament_id, stadium,
    ai_prediction, ai_prediction_score, ai_prediction_generated_at, ai_prediction_source
"#;

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a PostgreSQL store from an existing connection pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(r: &PgRow) -> MatchRecord {
        let phase: String = r.get("phase");
        let source = r
            .get::<Option<String>, _>("ai_prediction_source")
            .and_then(|s| match PredictionSource::try_from(s.as_str()) {
                Ok(source) => Some(source),
                Err(e) => {
                    warn!(error = %e, "ignoring unknown prediction source");
                    None
                }
            });

        MatchRecord {
            id: r.get("id"),
            home_team: r.get::<Option<String>, _>("home_team").unwrap_or_default(),
            away_team: r.get::<Option<String>, _>("away_team").unwrap_or_default(),
            phase: Phase::from(phase.as_str()),
            tournament_id: r.get("tournament_id"),
            stadium: r.get("stadium"),
            ai_prediction: r.get("ai_prediction"),
            ai_prediction_score: r.get("ai_prediction_score"),
            ai_prediction_generated_at: r.get("ai_prediction_generated_at"),
            ai_prediction_source: source,
        }
    }
}

#[async_trait]
impl MatchStore for PostgresStore {
    #[instrument(skip(self))]
    async fn find_match(&self, id: Uuid) -> Result<Option<MatchRecord>> {
        let row = sqlx::query(&format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn find_matches(&self, ids: &[Uuid]) -> Result<Vec<MatchRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE id = ANY($1)",
            MATCH_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        debug!(requested = ids.len(), found = rows.len(), "loaded matches");
        Ok(rows.iter().map(Self::map_row).collect())
    }

    #[instrument(skip(self, write), fields(score = %write.score, source = %write.source))]
    async fn save_prediction(&self, id: Uuid, write: &PredictionWrite) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches SET
                ai_prediction = $2,
                ai_prediction_score = $3,
                ai_prediction_generated_at = $4,
                ai_prediction_source = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&write.prediction_json)
        .bind(&write.score)
        .bind(write.generated_at)
        .bind(write.source.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn clear_prediction(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches SET
                ai_prediction = NULL,
                ai_prediction_score = NULL,
                ai_prediction_generated_at = NULL,
                ai_prediction_source = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn assign_teams(&self, id: Uuid, home_team: &str, away_team: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE matches SET
                home_team = $2,
                away_team = $3,
                ai_prediction = NULL,
                ai_prediction_score = NULL,
                ai_prediction_generated_at = NULL,
                ai_prediction_source = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(home_team)
        .bind(away_team)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
