//! Settings REST handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use super::dto::{SettingsResponse, UpdateSettingsRequest};
use crate::application::{SettingsError, SettingsStore};
use crate::interfaces::http::common::ApiResponse;

#[derive(Clone)]
pub struct SettingsState {
    pub store: Arc<SettingsStore>,
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Current defaults", body = ApiResponse<SettingsResponse>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
pub async fn get_settings(State(state): State<SettingsState>) -> Json<ApiResponse<SettingsResponse>> {
    Json(ApiResponse::success(state.store.defaults().await.into()))
}

/// Update the form defaults (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Defaults updated", body = ApiResponse<SettingsResponse>),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin role required"),
        (status = 422, description = "Value out of range")
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
pub async fn update_settings(
    State(state): State<SettingsState>,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SettingsResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!("Invalid JSON: {}", rejection.body_text()))),
        )
    })?;

    match state.store.update(request.into()).await {
        Ok(defaults) => Ok(Json(ApiResponse::success(defaults.into()))),
        Err(SettingsError::Invalid(errors)) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(errors.to_string())),
        )),
        Err(e) => {
            error!(error = %e, "Failed to update settings");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to update settings: {}", e))),
            ))
        }
    }
}
