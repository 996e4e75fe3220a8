use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::users::repo_types::{check_username, NewUser, User, UserUpdate};
use crate::users::session;

fn same_identity(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl User {
    pub async fn find_by_id(db: &Database, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(db.users().await?.into_iter().find(|u| u.id == id))
    }

    /// Case-insensitive lookup by email.
    pub async fn find_by_email(db: &Database, email: &str) -> anyhow::Result<Option<User>> {
        Ok(db
            .users()
            .await?
            .into_iter()
            .find(|u| same_identity(&u.email, email)))
    }

    /// Case-insensitive lookup by username.
    pub async fn find_by_username(db: &Database, username: &str) -> anyhow::Result<Option<User>> {
        Ok(db
            .users()
            .await?
            .into_iter()
            .find(|u| same_identity(&u.username, username)))
    }

    /// Insert a new user with zero tokens.
    pub async fn create(db: &Database, new: NewUser) -> ServiceResult<User> {
        let _guard = db.lock().await;
        let mut users = db.users().await?;

        if users.iter().any(|u| same_identity(&u.email, &new.email)) {
            warn!(email = %new.email, "email already registered");
            return Err(ServiceError::DuplicateEmail);
        }
        if users.iter().any(|u| same_identity(&u.username, &new.username)) {
            warn!(username = %new.username, "username already taken");
            return Err(ServiceError::DuplicateUsername);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new.email.trim().to_lowercase(),
            username: new.username.trim().to_string(),
            password_hash: new.password_hash,
            tokens: 0,
            created_at: OffsetDateTime::now_utc(),
            gender: new.profile.gender,
            dob: new.profile.dob,
            profession: new.profile.profession,
            country: new.profile.country,
        };
        users.push(user.clone());
        db.save_users(&users).await?;

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    pub async fn update(db: &Database, id: Uuid, update: UserUpdate) -> ServiceResult<User> {
        let _guard = db.lock().await;
        Self::update_locked(db, id, update).await
    }

    /// `update` for callers already holding the writer lock.
    pub(crate) async fn update_locked(
        db: &Database,
        id: Uuid,
        update: UserUpdate,
    ) -> ServiceResult<User> {
        let mut users = db.users().await?;

        if let Some(name) = update.username.as_deref() {
            check_username(name)?;
            if users
                .iter()
                .any(|u| u.id != id && same_identity(&u.username, name))
            {
                return Err(ServiceError::DuplicateUsername);
            }
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ServiceError::NotFound)?;
        update.apply(user);
        let updated = user.clone();

        db.save_users(&users).await?;
        session::refresh_if_current(db, &updated).await?;
        debug!(user_id = %id, "user updated");
        Ok(updated)
    }

    /// Atomically add `amount` to the user's balance.
    pub async fn credit_tokens(db: &Database, id: Uuid, amount: u64) -> ServiceResult<User> {
        let _guard = db.lock().await;
        let mut users = db.users().await?;
        let updated = credit(&mut users, id, amount)?;
        db.save_users(&users).await?;
        session::refresh_if_current(db, &updated).await?;
        Ok(updated)
    }
}

/// In-memory credit on a loaded users collection.
pub(crate) fn credit(users: &mut [User], id: Uuid, amount: u64) -> ServiceResult<User> {
    let user = users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(ServiceError::NotFound)?;
    user.tokens = user
        .tokens
        .checked_add(amount)
        .ok_or_else(|| ServiceError::validation("token balance overflow"))?;
    Ok(user.clone())
}
