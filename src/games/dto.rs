use serde::{Deserialize, Serialize};

use crate::games::repo_types::GameResult;
use crate::games::services::Game;

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub game_name: String,
    pub score: u64,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub result: GameResult,
    pub balance: u64,
}

#[derive(Debug, Serialize)]
pub struct GameInfo {
    pub game: Game,
    pub name: &'static str,
    pub tokens_per_point: u64,
}

impl From<Game> for GameInfo {
    fn from(game: Game) -> Self {
        Self {
            game,
            name: game.name(),
            tokens_per_point: game.tokens_per_point(),
        }
    }
}
