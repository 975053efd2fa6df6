use serde::Serialize;
use sqlx::FromRow;

/// Public user record. The password hash never leaves the repo.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, FromRow)]
pub(crate) struct UserCredentials {
    pub password: String,
    #[sqlx(flatten)]
    pub user: User,
}

/// User with the ids of jobs they applied to.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}
