//! The device-wide "current user" pointer.
//!
//! The pointer is a full snapshot of the user, so writers to the users
//! collection call [`refresh_if_current`] to keep it in step. Both paths
//! write under the database writer lock.

use tracing::debug;

use crate::db::Database;
use crate::users::repo_types::User;

pub async fn current(db: &Database) -> anyhow::Result<Option<User>> {
    db.current_user().await
}

pub async fn set_current(db: &Database, user: Option<&User>) -> anyhow::Result<()> {
    let _guard = db.lock().await;
    db.set_current_user(user).await?;
    debug!(user_id = ?user.map(|u| u.id), "session pointer set");
    Ok(())
}

/// Caller must hold the writer lock.
pub(crate) async fn refresh_if_current(db: &Database, user: &User) -> anyhow::Result<()> {
    match db.current_user().await? {
        Some(cur) if cur.id == user.id => db.set_current_user(Some(user)).await,
        _ => Ok(()),
    }
}
