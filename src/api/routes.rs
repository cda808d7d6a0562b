use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Prediction endpoints
        .route("/ai-predictions/bulk", post(handlers::get_bulk_predictions))
        .route("/ai-predictions/:match_id", get(handlers::get_prediction))
        .route(
            "/ai-predictions/:match_id/cache",
            delete(handlers::clear_prediction_cache),
        )
        .route(
            "/ai-predictions/:match_id/generate",
            post(handlers::generate_prediction),
        )
        // Match endpoints
        .route("/matches/:match_id/teams", put(handlers::assign_teams))
        // System endpoints
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        .layer(cors)
}
