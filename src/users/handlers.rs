use axum::{
    extract::{rejection::PathRejection, FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    AppliedResponse, CreatedUserResponse, DeletedResponse, NewUser, UpdateUser, UserResponse,
    UsersResponse,
};
use super::repo_types::{User, UserDetail};
use crate::{
    auth::{
        extractors::{Admin, AdminOrSameUser},
        jwt::JwtKeys,
    },
    error::AppError,
    state::AppState,
    validation::ValidatedJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:username",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/:username/jobs/:id", post(apply_to_job))
}

/// Admin-only user creation; the new user may be an admin.
/// Returns the user and a token for them.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    ValidatedJson(payload): ValidatedJson<NewUser>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), AppError> {
    let user = User::register(&state.db, payload).await?;
    let token = JwtKeys::from_ref(&state).sign(&user.username, user.is_admin)?;
    info!(username = %user.username, is_admin = user.is_admin, "user created");
    Ok((StatusCode::CREATED, Json(CreatedUserResponse { user, token })))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Admin(_admin): Admin,
) -> Result<Json<UsersResponse>, AppError> {
    let users = User::find_all(&state.db).await?;
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminOrSameUser(_claims): AdminOrSameUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse<UserDetail>>, AppError> {
    let user = User::get(&state.db, &username).await?;
    Ok(Json(UserResponse { user }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminOrSameUser(_claims): AdminOrSameUser,
    Path(username): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUser>,
) -> Result<Json<UserResponse<User>>, AppError> {
    let user = User::update(&state.db, &username, payload).await?;
    info!(%username, "user updated");
    Ok(Json(UserResponse { user }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminOrSameUser(_claims): AdminOrSameUser,
    Path(username): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    User::remove(&state.db, &username).await?;
    info!(%username, "user deleted");
    Ok(Json(DeletedResponse { deleted: username }))
}

#[instrument(skip(state))]
pub async fn apply_to_job(
    State(state): State<AppState>,
    AdminOrSameUser(_claims): AdminOrSameUser,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> Result<(StatusCode, Json<AppliedResponse>), AppError> {
    let Path((username, id)) = path.map_err(|e| AppError::bad_request(e.body_text()))?;
    let applied = User::apply_to_job(&state.db, &username, id).await?;
    info!(%username, job_id = applied, "applied to job");
    Ok((StatusCode::CREATED, Json(AppliedResponse { applied })))
}
