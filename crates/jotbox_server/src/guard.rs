//! Authentication guards as axum extractors.
//!
//! A handler that takes `ApiUser` or `PageUser` only runs for a caller with
//! a live, correctly signed session cookie. `ApiUser` rejects with a 401 JSON
//! body, `PageUser` with a redirect to the login page. `Option<PageUser>`
//! never rejects; pages reachable while signed out use it.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::response::Redirect;
use jotbox_core::UserId;
use log::debug;
use std::convert::Infallible;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

pub const SESSION_COOKIE: &str = "jotbox_session";
pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Caller identity for JSON API routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiUser(pub UserId);

impl FromRequestParts<AppState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state).await?;
        let user_id = state.require_session(token).await?;
        Ok(Self(user_id))
    }
}

/// Caller identity for browser page routes.
#[derive(Debug, Clone)]
pub struct PageUser {
    pub user_id: UserId,
    pub token: String,
}

impl PageUser {
    async fn resolve(parts: &mut Parts, state: &AppState) -> Option<Self> {
        let token = session_token(parts, state).await.ok().flatten()?;
        let user_id = state.require_session(Some(token.clone())).await.ok()?;
        Some(Self { user_id, token })
    }
}

impl FromRequestParts<AppState> for PageUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::resolve(parts, state)
            .await
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

impl OptionalFromRequestParts<AppState> for PageUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(Self::resolve(parts, state).await)
    }
}

/// Reads the session token from the signed cookie. A missing or tampered
/// cookie yields `None`.
async fn session_token(parts: &mut Parts, state: &AppState) -> Result<Option<String>, ApiError> {
    let cookies = Cookies::from_request_parts(parts, state)
        .await
        .map_err(|(_, message)| ApiError::Internal(message.to_string()))?;

    let verified = cookies.signed(state.cookie_key()).get(SESSION_COOKIE);
    if verified.is_none() && cookies.get(SESSION_COOKIE).is_some() {
        debug!("event=session_cookie module=server status=rejected reason=bad_signature");
    }
    Ok(verified.map(|cookie| cookie.value().to_string()))
}

/// Builds the session cookie carrying `token`; the caller signs it.
pub fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Builds the removal counterpart of `session_cookie`.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookie
}
