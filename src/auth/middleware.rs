use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::jwt::JwtKeys;
use crate::state::AppState;

/// Attaches verified [`Claims`](super::claims::Claims) to the request
/// extensions. A missing or bad token never fails the request; it just
/// stays anonymous and the route guards decide.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match JwtKeys::from_ref(&state).verify(token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
            }
            Err(e) => debug!(error = %e, "ignoring invalid token"),
        }
    }
    next.run(req).await
}

/// Token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
