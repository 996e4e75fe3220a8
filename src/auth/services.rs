use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::SignupRequest;
use crate::auth::password::{check_password_rules, hash_password, verify_password};
use crate::auth::reset_codes::ResetCode;
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::users::repo_types::{check_username, NewUser, User, UserUpdate};
use crate::users::session;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create an account and make it the current session.
#[instrument(skip(state, req), fields(email = %req.email, username = %req.username))]
pub async fn signup(state: &AppState, req: SignupRequest) -> ServiceResult<User> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ServiceError::validation("Please enter a valid email address"));
    }
    check_username(&req.username)?;
    check_password_rules(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            email,
            username: req.username,
            password_hash,
            profile: req.profile,
        },
    )
    .await?;

    session::set_current(&state.db, Some(&user)).await?;
    info!(user_id = %user.id, "signup complete");
    Ok(user)
}

/// `identifier` is tried as an email first, then as a username.
#[instrument(skip(state, password))]
pub async fn login(state: &AppState, identifier: &str, password: &str) -> ServiceResult<User> {
    let user = match User::find_by_email(&state.db, identifier).await? {
        Some(u) => Some(u),
        None => User::find_by_username(&state.db, identifier).await?,
    };

    let Some(user) = user else {
        warn!(identifier, "login unknown account");
        return Err(ServiceError::InvalidCredentials);
    };

    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "stored password hash unreadable");
        ServiceError::Storage(e)
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ServiceError::InvalidCredentials);
    }

    session::set_current(&state.db, Some(&user)).await?;
    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

pub async fn logout(state: &AppState) -> ServiceResult<()> {
    session::set_current(&state.db, None).await?;
    info!("user logged out");
    Ok(())
}

/// The session user as currently stored in the directory, or
/// `InvalidCredentials` when nobody is logged in.
pub async fn require_current(state: &AppState) -> ServiceResult<User> {
    let snapshot = session::current(&state.db)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;
    User::find_by_id(&state.db, snapshot.id)
        .await?
        .ok_or(ServiceError::InvalidCredentials)
}

pub async fn update_profile(state: &AppState, update: UserUpdate) -> ServiceResult<User> {
    let current = require_current(state).await?;
    User::update(&state.db, current.id, update).await
}

/// Issue a fresh code and mail it. Any earlier code for the address stops working.
#[instrument(skip(state))]
pub async fn request_password_reset(state: &AppState, email: &str) -> ServiceResult<()> {
    let Some(user) = User::find_by_email(&state.db, email).await? else {
        warn!(email, "reset requested for unknown email");
        return Err(ServiceError::UserNotFound);
    };

    let now = OffsetDateTime::now_utc();
    let ttl = Duration::minutes(state.config.reset_code_ttl_minutes);
    let issued = ResetCode::issue(&user.email, now, ttl);

    state
        .mailer
        .send_reset_code(&user.email, &issued.code)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "reset email failed");
            ServiceError::EmailDeliveryFailed(e.to_string())
        })?;

    let _guard = state.db.lock().await;
    let mut codes = state.db.reset_codes().await?;
    codes.retain(|c| c.is_active(now) && c.email != issued.email);
    codes.push(issued);
    state.db.save_reset_codes(&codes).await?;

    info!(user_id = %user.id, "reset code issued");
    Ok(())
}

/// Consume a code and set a new password. A code works at most once.
#[instrument(skip(state, code, new_password))]
pub async fn reset_password(
    state: &AppState,
    email: &str,
    code: &str,
    new_password: &str,
) -> ServiceResult<()> {
    check_password_rules(new_password)?;
    let new_hash = hash_password(new_password)?;
    let now = OffsetDateTime::now_utc();

    let _guard = state.db.lock().await;
    let before = state.db.reset_codes().await?;
    let Some(idx) = before.iter().position(|c| c.matches(email, code, now)) else {
        warn!(email, "invalid or expired reset code");
        return Err(ServiceError::InvalidOrExpiredCode);
    };
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(ServiceError::UserNotFound)?;

    let mut codes = before.clone();
    codes[idx].used = true;
    state.db.save_reset_codes(&codes).await?;

    if let Err(e) = User::update_locked(&state.db, user.id, UserUpdate::password(new_hash)).await {
        error!(error = %e, user_id = %user.id, "password update failed; restoring reset code");
        state.db.save_reset_codes(&before).await?;
        return Err(e);
    }

    info!(user_id = %user.id, "password reset");
    Ok(())
}
