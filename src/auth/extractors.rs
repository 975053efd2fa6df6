use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::warn;

use super::claims::Claims;
use crate::error::AppError;

/// Requires a verified token.
pub fn ensure_logged_in(claims: Option<&Claims>) -> Result<&Claims, AppError> {
    claims.ok_or_else(AppError::unauthorized)
}

/// Requires a verified token with the admin flag.
pub fn ensure_admin(claims: Option<&Claims>) -> Result<&Claims, AppError> {
    let claims = ensure_logged_in(claims)?;
    if !claims.is_admin {
        warn!(username = %claims.username, "admin required");
        return Err(AppError::unauthorized());
    }
    Ok(claims)
}

/// Requires an admin, or the user named by the `:username` path segment.
pub fn ensure_admin_or_same_user<'a>(
    claims: Option<&'a Claims>,
    username: Option<&str>,
) -> Result<&'a Claims, AppError> {
    let claims = ensure_logged_in(claims)?;
    let username = username.ok_or_else(AppError::unauthorized)?;
    if claims.is_admin || claims.username == username {
        return Ok(claims);
    }
    warn!(username = %claims.username, target = %username, "not admin or same user");
    Err(AppError::unauthorized())
}

/// Any logged-in user.
#[derive(Debug)]
pub struct LoggedIn(pub Claims);

/// Logged-in admin.
#[derive(Debug)]
pub struct Admin(pub Claims);

/// Logged-in admin, or the user the route is about.
#[derive(Debug)]
pub struct AdminOrSameUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for LoggedIn
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ensure_logged_in(parts.extensions.get::<Claims>())
            .cloned()
            .map(LoggedIn)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ensure_admin(parts.extensions.get::<Claims>())
            .cloned()
            .map(Admin)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminOrSameUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .ok();
        let username = params
            .as_ref()
            .and_then(|p| p.0.get("username"))
            .map(String::as_str);

        ensure_admin_or_same_user(parts.extensions.get::<Claims>(), username)
            .cloned()
            .map(AdminOrSameUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(username: &str, is_admin: bool) -> Claims {
        Claims {
            username: username.into(),
            is_admin,
            iat: 0,
            exp: 0,
            iss: "test".into(),
            aud: "test".into(),
        }
    }

    #[test]
    fn logged_in_requires_claims() {
        let c = claims("test", false);
        assert!(ensure_logged_in(Some(&c)).is_ok());
        assert!(matches!(ensure_logged_in(None), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn admin_requires_flag() {
        assert!(ensure_admin(Some(&claims("test", true))).is_ok());
        assert!(matches!(
            ensure_admin(Some(&claims("test", false))),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(ensure_admin(None), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn same_user_passes() {
        let c = claims("test", false);
        assert!(ensure_admin_or_same_user(Some(&c), Some("test")).is_ok());
    }

    #[test]
    fn admin_passes_for_other_user() {
        let c = claims("other-user", true);
        assert!(ensure_admin_or_same_user(Some(&c), Some("test")).is_ok());
    }

    #[test]
    fn different_non_admin_user_is_rejected() {
        let c = claims("other-user", false);
        assert!(matches!(
            ensure_admin_or_same_user(Some(&c), Some("test")),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn missing_param_or_claims_is_rejected() {
        let c = claims("other-user", false);
        assert!(ensure_admin_or_same_user(Some(&c), None).is_err());
        assert!(ensure_admin_or_same_user(None, Some("test")).is_err());

        let admin = claims("admin", true);
        assert!(ensure_admin_or_same_user(Some(&admin), None).is_err());
    }
}
