/// Session cookie handling and the login guard
///
/// The session lives entirely in a signed, HttpOnly cookie. Protected routes
/// are wrapped in [`require_session`], which redirects to `/login` unless the
/// cookie carries a valid, unexpired claim. On success the username is
/// inserted into request extensions as [`CurrentUser`].

use crate::{app::AppState, error::ApiResult};
use agriscan_shared::auth::session::AuthDecision;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "agriscan_session";

/// Authenticated username, available to handlers behind [`require_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Resolves the signed-in user from the cookie jar, if any
pub fn current_user(state: &AppState, jar: &CookieJar) -> Option<String> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());

    match state.sessions.require_auth(token) {
        AuthDecision::Authorized(username) => Some(username),
        AuthDecision::Unauthorized => None,
    }
}

/// Issues a session for `username` and adds its cookie to the jar
pub fn start_session(state: &AppState, jar: CookieJar, username: &str) -> ApiResult<CookieJar> {
    let token = state.sessions.issue(username)?;
    let max_age = time::Duration::seconds(state.sessions.ttl().num_seconds());

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.api.production)
        .max_age(max_age);

    tracing::debug!(username = %username, "Session started");
    Ok(jar.add(cookie))
}

/// Removes the session cookie
pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Login guard for protected routes
///
/// Runs before any body extraction, so unauthenticated uploads are never read.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match current_user(&state, &jar) {
        Some(username) => {
            req.extensions_mut().insert(CurrentUser(username));
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "Unauthenticated request redirected to login");
            Redirect::to("/login").into_response()
        }
    }
}
