//! Login, callback and logout endpoints

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::user::RequestContext,
    services::auth::AuthService,
    AppState,
};

use super::{AuthenticatedUser, SESSION_COOKIE, STATE_COOKIE};

/// Query string sent back by the identity provider
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn cookie(state: &AppState, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(state.config.auth.cookie_secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Redirect the browser to the identity provider
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    let nonce = AuthService::new_state();
    let url = state.services.auth.authorization_url(&nonce).await?;
    let jar = jar.add(cookie(&state, STATE_COOKIE, nonce));
    Ok((jar, Redirect::to(&url)))
}

/// Complete the login started by `/login`, open a session and go to the dashboard
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> AppResult<(CookieJar, Redirect)> {
    if let Some(error) = query.error {
        return Err(AppError::Authentication(format!("Login refused by provider: {}", error)));
    }

    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    match (expected, query.state) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => return Err(AppError::Authentication("Login state mismatch".to_string())),
    }

    let code = query
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let (user, token) = state.services.auth.complete_login(&code).await?;
    tracing::info!(user_id = user.id, email = %user.email, "User signed in");

    Ok(start_session(&state, jar, token))
}

/// Swap the pending login state for the session cookie
fn start_session(state: &AppState, jar: CookieJar, token: String) -> (CookieJar, Redirect) {
    let jar = jar
        .remove(Cookie::build(STATE_COOKIE).path("/"))
        .add(cookie(state, SESSION_COOKIE, token));
    (jar, Redirect::to("/"))
}

/// Drop the session cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), Redirect::to("/"))
}

/// Identity of the current session
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = RequestContext),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(AuthenticatedUser(ctx): AuthenticatedUser) -> Json<RequestContext> {
    Json(ctx)
}
