use sqlx::PgPool;
use tracing::warn;

use super::dto::{NewUser, UpdateUser};
use super::repo_types::{User, UserCredentials, UserDetail};
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::sql::{bind_values, sql_for_partial_update, SqlValue};

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

const UNIQUE_VIOLATION: &str = "23505";

impl User {
    /// Check a username/password pair.
    pub async fn authenticate(
        db: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let creds = sqlx::query_as::<_, UserCredentials>(&format!(
            "SELECT password, {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;

        if let Some(creds) = creds {
            if verify_password(password, &creds.password)? {
                return Ok(creds.user);
            }
        }
        warn!(%username, "invalid credentials");
        Err(AppError::Unauthorized("Invalid username/password".into()))
    }

    /// Insert a user with a hashed password.
    pub async fn register(db: &PgPool, data: NewUser) -> Result<User, AppError> {
        let username = data.username.clone();
        let hash = hash_password(&data.password)?;
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password, first_name, last_name, email, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.is_admin)
        .fetch_one(db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                warn!(%username, "duplicate username");
                Err(AppError::bad_request(format!("Duplicate username: {username}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_all(db: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// User plus the jobs they applied to.
    pub async fn get(db: &PgPool, username: &str) -> Result<UserDetail, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No user: {username}")))?;

        let jobs = sqlx::query_scalar::<_, i32>(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(db)
        .await?;

        Ok(UserDetail { user, jobs })
    }

    /// Partial update. A new password is hashed before it is stored.
    pub async fn update(
        db: &PgPool,
        username: &str,
        mut data: UpdateUser,
    ) -> Result<User, AppError> {
        if let Some(plain) = data.password.take() {
            data.password = Some(hash_password(&plain)?);
        }

        let update = sql_for_partial_update(
            data.changes(),
            &[("firstName", "first_name"), ("lastName", "last_name")],
        )?;
        let query = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {USER_COLUMNS}",
            update.set_cols(),
            update.next_placeholder(),
        );

        let mut values = update.values;
        values.push(SqlValue::Text(username.to_string()));
        bind_values(sqlx::query_as::<_, User>(&query), values)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No user: {username}")))
    }

    pub async fn remove(db: &PgPool, username: &str) -> Result<(), AppError> {
        sqlx::query_scalar::<_, String>("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No user: {username}")))?;
        Ok(())
    }

    /// Record an application. Applying twice is a no-op.
    pub async fn apply_to_job(db: &PgPool, username: &str, job_id: i32) -> Result<i32, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No job: {job_id}")))?;

        sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No user: {username}")))?;

        sqlx::query(
            "INSERT INTO applications (job_id, username) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(job_id)
        .bind(username)
        .execute(db)
        .await?;

        Ok(job_id)
    }
}
