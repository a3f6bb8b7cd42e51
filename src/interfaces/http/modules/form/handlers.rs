//! Calculator form handlers
//!
//! Anonymous access. The last successful result is remembered per session
//! (cookie) and shown again on the next `GET`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Form, Json,
};

use super::dto::{FormQuery, FormSubmission, FormView};
use super::session::{FormSessions, SessionId};
use crate::application::{EntryPoint, FuelCalculatorService, RequestContext, SettingsStore};
use crate::domain::RawInput;
use crate::interfaces::http::common::ClientIp;
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct FormState {
    pub service: Arc<FuelCalculatorService>,
    pub settings: Arc<SettingsStore>,
    pub sessions: Arc<FormSessions>,
}

fn respond(status: StatusCode, session: &SessionId, view: FormView) -> Response {
    let mut response = (status, Json(view)).into_response();
    if let Some(cookie) = session.cookie() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// Show the calculator form
///
/// Values come from the query string, then from the configured defaults.
/// The result area shows this session's last result, or `-`.
#[utoipa::path(
    get,
    path = "/fuel-calculator",
    tag = "Form",
    params(FormQuery),
    responses(
        (status = 200, description = "Form view", body = FormView)
    )
)]
pub async fn show_form(
    State(state): State<FormState>,
    headers: HeaderMap,
    Query(query): Query<FormQuery>,
) -> Response {
    let session = SessionId::from_headers(&headers);
    let defaults = state.settings.defaults().await;
    let result = state.sessions.get(&session.id);

    let view = FormView::prefilled(&query, &defaults, result.as_ref());
    respond(StatusCode::OK, &session, view)
}

/// Submit the calculator form
///
/// On success the result is stored in the session and returned in the view.
/// On failure every invalid field carries its message and the status is 422.
#[utoipa::path(
    post,
    path = "/fuel-calculator",
    tag = "Form",
    request_body(content = FormSubmission, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Calculated", body = FormView),
        (status = 422, description = "Invalid input, errors attached to fields", body = FormView)
    )
)]
pub async fn submit_form(
    State(state): State<FormState>,
    user: Option<Extension<AuthenticatedUser>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Form(form): Form<FormSubmission>,
) -> Response {
    let session = SessionId::from_headers(&headers);

    let mut ctx = RequestContext::new(EntryPoint::Form).with_source_address(ip);
    if let Some(Extension(user)) = user {
        ctx = ctx.with_actor(user.username);
    }

    match state.service.calculate(&RawInput::from(&form), &ctx) {
        Ok(result) => {
            state.sessions.store(&session.id, result.clone());
            let view = FormView::submitted(&form, Some(&result), None);
            respond(StatusCode::OK, &session, view)
        }
        Err(errors) => {
            let view = FormView::submitted(&form, None, Some(&errors));
            respond(StatusCode::UNPROCESSABLE_ENTITY, &session, view)
        }
    }
}

/// Reset the calculator form
///
/// Forgets this session's result and returns the default view.
#[utoipa::path(
    post,
    path = "/fuel-calculator/reset",
    tag = "Form",
    responses(
        (status = 200, description = "Default form view", body = FormView)
    )
)]
pub async fn reset_form(State(state): State<FormState>, headers: HeaderMap) -> Response {
    let session = SessionId::from_headers(&headers);
    state.sessions.clear(&session.id);

    let defaults = state.settings.defaults().await;
    let view = FormView::prefilled(&FormQuery::default(), &defaults, None);
    respond(StatusCode::OK, &session, view)
}
