use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::Database;
use crate::error::ServiceResult;
use crate::games::repo_types::GameResult;
use crate::users::{repo::credit, session};

impl GameResult {
    /// Append a result and credit its tokens to the owner, as one unit.
    ///
    /// An unknown user leaves the ledger untouched. If the ledger write fails
    /// after the balance was saved, the previous balances are put back.
    pub async fn record(
        db: &Database,
        user_id: Uuid,
        game_name: &str,
        score: u64,
        tokens_earned: u64,
    ) -> ServiceResult<GameResult> {
        let _guard = db.lock().await;

        let before = db.users().await?;
        let mut users = before.clone();
        let owner = credit(&mut users, user_id, tokens_earned)?;

        let result = GameResult {
            id: Uuid::new_v4(),
            user_id,
            game_name: game_name.to_string(),
            score,
            tokens_earned,
            timestamp: OffsetDateTime::now_utc(),
        };
        let mut results = db.game_results().await?;
        results.push(result.clone());

        db.save_users(&users).await?;
        if let Err(e) = db.save_game_results(&results).await {
            error!(error = %e, %user_id, "ledger append failed; rolling back credit");
            db.save_users(&before).await?;
            return Err(e.into());
        }
        session::refresh_if_current(db, &owner).await?;

        info!(
            %user_id,
            game = game_name,
            score,
            tokens_earned,
            balance = owner.tokens,
            "game result recorded"
        );
        Ok(result)
    }

    /// All results for a user, oldest first.
    pub async fn history_for(db: &Database, user_id: Uuid) -> anyhow::Result<Vec<GameResult>> {
        Ok(db
            .game_results()
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect())
    }
}
