//! Axum adapter for the admin actions.
//!
//! | Route | Fields | Response |
//! |-------|--------|----------|
//! | `GET /settings` | | [`SettingsPage`] JSON, 403 for non-admins |
//! | `POST /save-settings` | `apiKey`, `fromEmail`, `senderName`, `security` | [`ActionResponse`] JSON |
//! | `POST /test-email` | `testEmail`, `security` | [`ActionResponse`] JSON |
//!
//! Request bodies are `application/x-www-form-urlencoded`. The `security`
//! token is checked before the other fields are looked at, so a forged or
//! missing token always answers `200 OK` with "Security check failed.".
//! With a valid token, missing or unknown fields are rejected with `422`.
//! Other failed actions answer `200 OK` with `success: false`.
//!
//! ```rust,ignore
//! use resend_relay::routes::{admin_router, CallerResolver};
//!
//! let app = Router::new().nest("/admin/resend", admin_router(actions, Arc::new(MyResolver)));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::de::DeserializeOwned;

use crate::actions::{
    ActionResponse, AdminActions, SaveSettingsRequest, SettingsPage, TestEmailRequest,
};
use crate::auth::{Action, Caller};
use crate::error::MailError;

/// Re-exported axum types, so hosts and tests use the same axum version.
pub mod reexports {
    pub use axum::body::Body;
    pub use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    pub use axum::response::Response;
    pub use axum::Router;
}

/// Maps an incoming request to the caller behind it.
///
/// Session handling belongs to the host; the resolver only reports who is
/// calling and what they may do.
pub trait CallerResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Caller;
}

impl<F> CallerResolver for F
where
    F: Fn(&HeaderMap) -> Caller + Send + Sync,
{
    fn resolve(&self, headers: &HeaderMap) -> Caller {
        self(headers)
    }
}

/// Shared state for routes.
#[derive(Clone)]
struct AppState {
    actions: AdminActions,
    resolver: Arc<dyn CallerResolver>,
}

/// Create the admin router.
pub fn admin_router(actions: AdminActions, resolver: Arc<dyn CallerResolver>) -> Router {
    let state = AppState { actions, resolver };

    Router::new()
        .route("/settings", get(settings_page))
        .route("/save-settings", post(save_settings))
        .route("/test-email", post(test_email))
        .with_state(state)
}

/// GET /settings - Current settings and fresh tokens.
async fn settings_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SettingsPage>, StatusCode> {
    let caller = state.resolver.resolve(&headers);
    match state.actions.settings_page(&caller) {
        Ok(page) => Ok(Json(page)),
        Err(MailError::SecurityCheckFailed) => Err(StatusCode::FORBIDDEN),
        Err(e) => {
            tracing::error!(error = %e, "Could not load settings page");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Form fields before the security check.
type RawForm = HashMap<String, String>;

/// Check the caller and the `security` field, then parse the typed request.
///
/// The error is the finished response: a security failure or a `422`.
fn authorized_request<T: DeserializeOwned>(
    actions: &AdminActions,
    caller: &Caller,
    action: Action,
    fields: RawForm,
) -> Result<T, Response> {
    let token = fields.get("security").map(String::as_str);
    if let Err(e) = actions.authorize(caller, action, token) {
        return Err(Json(ActionResponse::failure(e.user_message())).into_response());
    }

    serde_json::to_value(fields)
        .and_then(serde_json::from_value)
        .map_err(|e| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to deserialize form body: {}", e),
            )
                .into_response()
        })
}

/// POST /save-settings
async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<RawForm>,
) -> Response {
    let caller = state.resolver.resolve(&headers);
    let request: SaveSettingsRequest =
        match authorized_request(&state.actions, &caller, Action::SaveSettings, fields) {
            Ok(request) => request,
            Err(response) => return response,
        };
    Json(state.actions.save_settings(&caller, request)).into_response()
}

/// POST /test-email
async fn test_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<RawForm>,
) -> Response {
    let caller = state.resolver.resolve(&headers);
    let request: TestEmailRequest =
        match authorized_request(&state.actions, &caller, Action::TestEmail, fields) {
            Ok(request) => request,
            Err(response) => return response,
        };
    Json(state.actions.send_test_email(&caller, request).await).into_response()
}
