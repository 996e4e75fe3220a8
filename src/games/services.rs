use serde::Serialize;
use tracing::instrument;

use crate::auth::services::require_current;
use crate::error::{ServiceError, ServiceResult};
use crate::games::repo_types::GameResult;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Game {
    TokenClicker,
    KnowledgeQuiz,
    TrueOrFalse,
}

impl Game {
    pub const ALL: [Game; 3] = [Game::TokenClicker, Game::KnowledgeQuiz, Game::TrueOrFalse];

    pub fn name(self) -> &'static str {
        match self {
            Game::TokenClicker => "Token Clicker",
            Game::KnowledgeQuiz => "Knowledge Quiz",
            Game::TrueOrFalse => "True or False",
        }
    }

    pub fn from_name(name: &str) -> Option<Game> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }

    /// Tokens per point (clicker) or per correct answer (quizzes).
    pub fn tokens_per_point(self) -> u64 {
        match self {
            Game::TokenClicker => 2,
            Game::KnowledgeQuiz => 5,
            Game::TrueOrFalse => 4,
        }
    }
}

/// Unknown games pay one token per point.
pub fn tokens_earned(game_name: &str, score: u64) -> u64 {
    let rate = Game::from_name(game_name).map_or(1, Game::tokens_per_point);
    score.saturating_mul(rate)
}

/// Record a finished game for the logged-in player, pricing it server-side.
#[instrument(skip(state))]
pub async fn claim(state: &AppState, game_name: &str, score: u64) -> ServiceResult<GameResult> {
    let game_name = game_name.trim();
    if game_name.is_empty() {
        return Err(ServiceError::validation("game_name is required"));
    }
    let player = require_current(state).await?;
    let tokens = tokens_earned(game_name, score);
    GameResult::record(&state.db, player.id, game_name, score, tokens).await
}

pub async fn my_history(state: &AppState) -> ServiceResult<Vec<GameResult>> {
    let player = require_current(state).await?;
    Ok(GameResult::history_for(&state.db, player.id).await?)
}
