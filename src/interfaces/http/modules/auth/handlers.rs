//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, warn};

use super::dto::{LoginRequest, LoginResponse, UserInfo};
use crate::infrastructure::crypto::jwt::create_token;
use crate::infrastructure::crypto::password::password_matches;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::{AuthError, AuthMethod, AuthState, AuthenticatedUser};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    let invalid = || {
        let e = AuthError::InvalidCredentials;
        (e.status(), Json(ApiResponse::error(e.to_string())))
    };

    let Some(user) = state.find_user(&request.username) else {
        warn!(username = %request.username, "Login attempt for unknown user");
        return Err(invalid());
    };

    if !password_matches(&request.password, &user.password_hash) {
        warn!(username = %request.username, "Login attempt with wrong password");
        return Err(invalid());
    }

    let token = create_token(&user.username, &user.role, &state.jwt_config).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("Failed to create token: {}", e))),
        )
    })?;

    info!(username = %user.username, "User logged in");

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expiration_hours * 3600,
        user: UserInfo {
            username: user.username.clone(),
            role: user.role.clone(),
            auth_method: "jwt".to_string(),
        },
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserInfo>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
pub async fn get_current_user(Extension(user): Extension<AuthenticatedUser>) -> Json<ApiResponse<UserInfo>> {
    let auth_method = match user.auth_method {
        AuthMethod::Jwt => "jwt",
        AuthMethod::ApiKey { .. } => "api_key",
    };
    Json(ApiResponse::success(UserInfo {
        username: user.username,
        role: user.role,
        auth_method: auth_method.to_string(),
    }))
}
