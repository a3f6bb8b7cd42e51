//! Calculator REST handler

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CalculateErrorResponse, CalculateRequest};
use crate::application::{EntryPoint, FuelCalculatorService, RequestContext};
use crate::domain::{CalculationResult, RawInput};
use crate::interfaces::http::common::ClientIp;
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct CalculatorState {
    pub service: Arc<FuelCalculatorService>,
}

/// Calculate fuel spent and fuel cost
///
/// Results use one decimal and a comma separator (`"8,0"`).
/// Requires a JWT or an API key.
#[utoipa::path(
    post,
    path = "/api/fuel-calculate",
    tag = "Calculator",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Calculation result", body = CalculationResult),
        (status = 400, description = "Invalid input", body = CalculateErrorResponse),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
pub async fn calculate(
    State(state): State<CalculatorState>,
    Extension(user): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculationResult>, (StatusCode, Json<CalculateErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(CalculateErrorResponse::message(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        )
    })?;

    let ctx = RequestContext::new(EntryPoint::Rest)
        .with_actor(user.username)
        .with_source_address(ip);

    state
        .service
        .calculate(&RawInput::from(&request), &ctx)
        .map(Json)
        .map_err(|errors| (StatusCode::BAD_REQUEST, Json(CalculateErrorResponse::from(&errors))))
}
