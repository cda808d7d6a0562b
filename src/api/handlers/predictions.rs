use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::error;
use uuid::Uuid;

use crate::api::{state::AppState, types::*};
use crate::error::PollaError;
use crate::events::{MatchEvent, TEAMS_ASSIGNED};
use crate::predictions::PredictionView;

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

pub(crate) fn to_http_error(e: PollaError) -> (StatusCode, String) {
    match e {
        PollaError::MatchNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        PollaError::InvalidTeams(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        other => {
            error!(error = %other, "prediction request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

/// Malformed ids cannot name a match, so they are reported as not found
fn parse_match_id(raw: &str) -> std::result::Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            PollaError::MatchNotFound(raw.to_string()).to_string(),
        )
    })
}

/// GET /ai-predictions/:matchId
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<PredictionView> {
    let match_id = parse_match_id(&match_id)?;
    let view = state
        .predictions
        .get_prediction(match_id)
        .await
        .map_err(to_http_error)?;
    Ok(Json(view))
}

/// DELETE /ai-predictions/:matchId/cache
pub async fn clear_prediction_cache(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<ClearCacheResponse> {
    let match_id = parse_match_id(&match_id)?;
    state
        .predictions
        .clear_cache(match_id)
        .await
        .map_err(to_http_error)?;

    Ok(Json(ClearCacheResponse {
        message: format!("AI prediction cache cleared for match {}", match_id),
        match_id,
    }))
}

/// POST /ai-predictions/bulk
pub async fn get_bulk_predictions(
    State(state): State<AppState>,
    Json(req): Json<BulkPredictionRequest>,
) -> ApiResult<BulkPredictionResponse> {
    let predictions = state
        .predictions
        .get_bulk_predictions(&req.match_ids)
        .await
        .map_err(to_http_error)?;
    Ok(Json(BulkPredictionResponse { predictions }))
}

/// POST /ai-predictions/:matchId/generate
///
/// Runs the retry controller inline; the response waits for any backoff.
pub async fn generate_prediction(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<GenerateResponse> {
    let match_id = parse_match_id(&match_id)?;
    let outcome = state
        .predictions
        .generate_and_save(match_id)
        .await
        .map_err(to_http_error)?;
    Ok(Json(GenerateResponse { match_id, outcome }))
}

/// PUT /matches/:matchId/teams
pub async fn assign_teams(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(req): Json<AssignTeamsRequest>,
) -> ApiResult<AssignTeamsResponse> {
    let match_id = parse_match_id(&match_id)?;
    state
        .predictions
        .assign_teams(match_id, &req.home_team, &req.away_team)
        .await
        .map_err(to_http_error)?;

    let listeners = state.events.publish(MatchEvent::TeamsAssigned {
        match_id,
        home_team: req.home_team.trim().to_string(),
        away_team: req.away_team.trim().to_string(),
    });

    Ok(Json(AssignTeamsResponse {
        match_id,
        event: TEAMS_ASSIGNED,
        listeners,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = to_http_error(PollaError::match_not_found(Uuid::nil()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = to_http_error(PollaError::InvalidTeams("empty".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = to_http_error(PollaError::Internal("boom".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_path_id_is_not_found() {
        let (status, body) = parse_match_id("not-a-uuid").unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("not-a-uuid"));
    }
}
