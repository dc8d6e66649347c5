//! HTTP use-case API.
//!
//! # Responsibility
//! - Parse and shape-check request bodies.
//! - Call account/session/note services and map results to status codes.
//!
//! # Invariants
//! - Every `/api/notes*` handler is gated by `ApiUser` and passes the
//!   caller's id to the note service; handlers never see foreign notes.
//! - A non-numeric note id is reported as not found.
//! - Request bodies are never logged.

use crate::error::{ApiError, NOTE_NOT_FOUND_MESSAGE, NO_DATA_MESSAGE};
use crate::guard::{
    expired_session_cookie, session_cookie, ApiUser, PageUser, HOME_PATH, LOGIN_PATH,
};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use jotbox_core::{core_version, Note, NoteId};
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;

const CREDENTIALS_REQUIRED_MESSAGE: &str = "Email and password are required";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Login/register body. `username` is accepted in place of `email`.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl CredentialsBody {
    /// Returns `(email, password)` when both are present and non-blank.
    fn into_pair(self) -> Option<(String, String)> {
        let email = self
            .email
            .filter(|value| !value.trim().is_empty())
            .or(self.username)
            .filter(|value| !value.trim().is_empty())?;
        let password = self.password.filter(|value| !value.is_empty())?;
        Some((email, password))
    }
}

/// Create/update note body.
#[derive(Debug, Default, Deserialize)]
pub struct NoteBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = require_credentials(payload)?;

    let (_, session) = state
        .with_sessions(move |gate| gate.register(&email, &password))
        .await?;
    cookies
        .signed(state.cookie_key())
        .add(session_cookie(session.token));

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Registration successful" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let (email, password) = require_credentials(payload)?;

    let session = state
        .with_sessions(move |gate| gate.login(&email, &password))
        .await
        .map_err(|err| match err {
            ApiError::Unauthorized(_) => {
                ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            other => other,
        })?;
    cookies
        .signed(state.cookie_key())
        .add(session_cookie(session.token));

    Ok(Json(
        json!({ "success": true, "message": "Login successful" }),
    ))
}

/// Signed-out landing page. A caller who already has a session goes home.
pub async fn login_page(user: Option<PageUser>) -> Response {
    match user {
        Some(_) => Redirect::to(HOME_PATH).into_response(),
        None => Json(json!({
            "authenticated": false,
            "login": LOGIN_PATH,
            "register": "/register",
        }))
        .into_response(),
    }
}

pub async fn home(user: PageUser) -> Json<Value> {
    Json(json!({ "authenticated": true, "user_id": user.user_id, "notes": "/api/notes" }))
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies, user: PageUser) -> Redirect {
    let token = user.token;
    if let Err(err) = state.with_sessions(move |gate| gate.logout(&token)).await {
        // The cookie is cleared either way; a stale row expires on its own.
        debug!(
            "event=logout module=server status=error user_id={} code={}",
            user.user_id,
            err.status().as_u16()
        );
    }
    cookies.remove(expired_session_cookie());
    Redirect::to(LOGIN_PATH)
}

pub async fn list_notes(
    State(state): State<AppState>,
    ApiUser(owner): ApiUser,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state
        .with_notes(move |notes| notes.list_notes(owner))
        .await?;
    Ok(Json(notes))
}

pub async fn current_note(
    State(state): State<AppState>,
    ApiUser(owner): ApiUser,
) -> Result<Json<Option<Note>>, ApiError> {
    let note = state
        .with_notes(move |notes| notes.current_note(owner))
        .await?;
    Ok(Json(note))
}

pub async fn create_note(
    State(state): State<AppState>,
    ApiUser(owner): ApiUser,
    payload: Result<Json<NoteBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = require_body(payload)?;
    let note = state
        .with_notes(move |notes| {
            notes.create_note(
                owner,
                body.title.as_deref().unwrap_or_default(),
                body.content.as_deref().unwrap_or_default(),
            )
        })
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<AppState>,
    ApiUser(owner): ApiUser,
    Path(raw_id): Path<String>,
    payload: Result<Json<NoteBody>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&raw_id)?;
    // An unusable body is handed on as `None`; the service decides between
    // 404 and 400.
    let body = require_body(payload).ok();
    let note = state
        .with_notes(move |notes| {
            let input = body.as_ref().map(|body| {
                (
                    body.title.as_deref().unwrap_or_default(),
                    body.content.as_deref().unwrap_or_default(),
                )
            });
            notes.update_note(owner, id, input)
        })
        .await?;
    Ok(Json(note))
}

pub async fn set_current_note(
    State(state): State<AppState>,
    ApiUser(owner): ApiUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&raw_id)?;
    let note = state
        .with_notes(move |notes| notes.set_current_note(owner, id))
        .await?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    ApiUser(owner): ApiUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_note_id(&raw_id)?;
    state
        .with_notes(move |notes| notes.delete_note(owner, id))
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "version": core_version() }))
}

fn require_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!(
                "event=request_body module=server status=rejected code={}",
                rejection.status().as_u16()
            );
            Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()))
        }
    }
}

fn require_credentials(
    payload: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<(String, String), ApiError> {
    require_body(payload)?
        .into_pair()
        .ok_or_else(|| ApiError::BadRequest(CREDENTIALS_REQUIRED_MESSAGE.to_string()))
}

fn parse_note_id(raw: &str) -> Result<NoteId, ApiError> {
    raw.parse::<NoteId>()
        .map_err(|_| ApiError::NotFound(NOTE_NOT_FOUND_MESSAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_note_id, CredentialsBody};

    fn body(email: Option<&str>, username: Option<&str>, password: Option<&str>) -> CredentialsBody {
        CredentialsBody {
            email: email.map(str::to_string),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn credentials_prefer_email_and_fall_back_to_username() {
        assert_eq!(
            body(Some("a@b.com"), Some("c@d.com"), Some("secret1")).into_pair(),
            Some(("a@b.com".to_string(), "secret1".to_string()))
        );
        assert_eq!(
            body(Some("  "), Some("c@d.com"), Some("secret1")).into_pair(),
            Some(("c@d.com".to_string(), "secret1".to_string()))
        );
        assert_eq!(
            body(None, Some("c@d.com"), Some("secret1")).into_pair(),
            Some(("c@d.com".to_string(), "secret1".to_string()))
        );
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(body(None, None, Some("secret1")).into_pair().is_none());
        assert!(body(Some("a@b.com"), None, None).into_pair().is_none());
        assert!(body(Some("a@b.com"), None, Some("")).into_pair().is_none());
    }

    #[test]
    fn note_id_must_be_numeric() {
        assert_eq!(parse_note_id("42").unwrap(), 42);
        assert!(parse_note_id("abc").is_err());
        assert!(parse_note_id("4.2").is_err());
    }
}
