use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LoginRequest, MessageResponse, PublicUser,
            ResetPasswordRequest, SignupRequest,
        },
        services,
    },
    error::ServiceError,
    state::AppState,
    users::repo_types::UserUpdate,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ServiceError> {
    let user = services::signup(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<PublicUser>, ServiceError> {
    let user = services::login(&state, &payload.identifier, &payload.password).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<StatusCode, ServiceError> {
    services::logout(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    services::request_password_reset(&state, &payload.email).await?;
    Ok(Json(MessageResponse::new("Reset code sent")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    services::reset_password(&state, &payload.email, &payload.code, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated")))
}

#[instrument(skip(state))]
pub async fn get_me(State(state): State<AppState>) -> Result<Json<PublicUser>, ServiceError> {
    let user = services::require_current(&state).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<PublicUser>, ServiceError> {
    let user = services::update_profile(&state, payload).await?;
    Ok(Json(user.into()))
}
