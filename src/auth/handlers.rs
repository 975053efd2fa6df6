use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{TokenRequest, TokenResponse},
    extractors::LoggedIn,
    jwt::JwtKeys,
};
use crate::{
    error::AppError,
    state::AppState,
    users::{
        dto::{RegisterUser, UserResponse},
        repo_types::{User, UserDetail},
    },
    validation::ValidatedJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(token))
        .route("/auth/register", post(register))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

/// Exchange a username/password for a token.
#[instrument(skip(state, payload))]
pub async fn token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = User::authenticate(&state.db, &payload.username, &payload.password).await?;
    let token = JwtKeys::from_ref(&state).sign(&user.username, user.is_admin)?;
    info!(username = %user.username, "token issued");
    Ok(Json(TokenResponse { token }))
}

/// Self-registration. New users are never admins.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterUser>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let user = User::register(&state.db, payload.into()).await?;
    let token = JwtKeys::from_ref(&state).sign(&user.username, user.is_admin)?;
    info!(username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    LoggedIn(claims): LoggedIn,
) -> Result<Json<UserResponse<UserDetail>>, AppError> {
    let user = User::get(&state.db, &claims.username).await?;
    Ok(Json(UserResponse { user }))
}
