use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{ClaimRequest, ClaimResponse, GameInfo};
use super::repo_types::GameResult;
use super::services::{self, Game};
use crate::{auth::services::require_current, error::ServiceError, state::AppState};

pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/results", post(claim_result))
        .route("/games/history", get(history))
}

pub async fn list_games() -> Json<Vec<GameInfo>> {
    Json(Game::ALL.into_iter().map(GameInfo::from).collect())
}

/// POST /games/results { game_name, score }
#[instrument(skip(state))]
pub async fn claim_result(
    State(state): State<AppState>,
    Json(body): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ServiceError> {
    let result = services::claim(&state, &body.game_name, body.score).await?;
    let balance = require_current(&state).await?.tokens;
    Ok((StatusCode::CREATED, Json(ClaimResponse { result, balance })))
}

#[instrument(skip(state))]
pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<GameResult>>, ServiceError> {
    Ok(Json(services::my_history(&state).await?))
}
