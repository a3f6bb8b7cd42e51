//! Authentication middleware for Axum
//!
//! Credentials are either a JWT (`Authorization: Bearer <token>`) or a
//! configured API key (`Authorization: fcalc_...` or `X-API-Key`).

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::debug;

use crate::config::{ApiKeyConfig, SecurityConfig, UserConfig};
use crate::infrastructure::crypto::api_key::{hash_api_key, is_api_key_format};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};
use crate::interfaces::http::common::ApiResponse;

/// Header checked for API keys in addition to `Authorization`.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::error(self.to_string()));
        (self.status(), body).into_response()
    }
}

/// Authentication state: JWT settings plus the configured accounts and keys
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub users: Arc<Vec<UserConfig>>,
    pub api_keys: Arc<Vec<ApiKeyConfig>>,
}

impl AuthState {
    pub fn from_config(cfg: &SecurityConfig) -> Self {
        Self {
            jwt_config: JwtConfig::from(cfg),
            users: Arc::new(cfg.users.clone()),
            api_keys: Arc::new(cfg.api_keys.clone()),
        }
    }

    pub fn find_user(&self, username: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.username == username)
    }

    fn find_api_key(&self, key: &str) -> Option<&ApiKeyConfig> {
        let key_hash = hash_api_key(key);
        self.api_keys
            .iter()
            .find(|k| k.key_hash.eq_ignore_ascii_case(&key_hash))
    }
}

/// Authenticated user information (either from JWT or API key)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub role: String,
    pub auth_method: AuthMethod,
}

/// How the user was authenticated
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    Jwt,
    ApiKey { name: String },
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
            auth_method: AuthMethod::Jwt,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Resolve the caller from request headers.
///
/// `Ok(None)` means no credentials were presented at all.
pub fn authenticate(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<Option<AuthenticatedUser>, AuthError> {
    let header_value = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

    if let Some(key) = header_value(API_KEY_HEADER) {
        return authenticate_api_key(key, auth_state).map(Some);
    }

    let Some(auth_header) = header_value(header::AUTHORIZATION.as_str()) else {
        return Ok(None);
    };

    if is_api_key_format(auth_header) {
        return authenticate_api_key(auth_header, auth_state).map(Some);
    }

    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;
    let claims = verify_token(token, &auth_state.jwt_config).map_err(|e| {
        debug!(error = %e, "JWT rejected");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        }
    })?;
    if claims.is_expired() {
        return Err(AuthError::ExpiredToken);
    }
    Ok(Some(AuthenticatedUser::from_claims(claims)))
}

fn authenticate_api_key(key: &str, auth_state: &AuthState) -> Result<AuthenticatedUser, AuthError> {
    if !is_api_key_format(key) {
        return Err(AuthError::InvalidApiKey);
    }
    let entry = auth_state.find_api_key(key).ok_or(AuthError::InvalidApiKey)?;
    Ok(AuthenticatedUser {
        username: entry.name.clone(),
        role: entry.role.clone(),
        auth_method: AuthMethod::ApiKey {
            name: entry.name.clone(),
        },
    })
}

/// JWT / API-key authentication middleware - requires valid credentials
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &auth_state) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => AuthError::MissingToken.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Optional authentication middleware
///
/// Valid credentials attach an [`AuthenticatedUser`]; missing or bad ones
/// are ignored and the request continues anonymously.
pub async fn optional_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Ok(Some(user)) = authenticate(request.headers(), &auth_state) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Admin-only middleware - must be used after auth_middleware
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(_) => AuthError::InsufficientPermissions.into_response(),
        None => AuthError::MissingToken.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::api_key::generate_api_key;
    use crate::infrastructure::crypto::jwt::create_token;
    use axum::http::HeaderValue;

    fn state_with_key(key_hash: String) -> AuthState {
        let mut cfg = SecurityConfig::default();
        cfg.api_keys.push(ApiKeyConfig {
            name: "reports".to_string(),
            key_hash,
            role: "operator".to_string(),
        });
        AuthState::from_config(&cfg)
    }

    fn headers(name: &'static str, value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(name, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn no_credentials_is_anonymous() {
        let state = state_with_key(String::new());
        assert_eq!(authenticate(&HeaderMap::new(), &state), Ok(None));
    }

    #[test]
    fn bearer_token_is_accepted() {
        let state = state_with_key(String::new());
        let token = create_token("alice", "admin", &state.jwt_config).unwrap();
        let user = authenticate(&headers("authorization", &format!("Bearer {token}")), &state)
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.is_admin());
        assert_eq!(user.auth_method, AuthMethod::Jwt);
    }

    #[test]
    fn garbage_credentials_are_rejected() {
        let state = state_with_key(String::new());
        assert_eq!(
            authenticate(&headers("authorization", "Bearer nope"), &state),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            authenticate(&headers("authorization", "Basic abc"), &state),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            authenticate(&headers("x-api-key", "fcalc_unknown"), &state),
            Err(AuthError::InvalidApiKey)
        );
    }

    #[test]
    fn configured_api_key_is_accepted_from_either_header() {
        let generated = generate_api_key("reports");
        let state = state_with_key(generated.key_hash.clone());

        for name in ["authorization", "x-api-key"] {
            let user = authenticate(&headers(name, &generated.key), &state)
                .unwrap()
                .unwrap();
            assert_eq!(user.username, "reports");
            assert!(!user.is_admin());
        }
    }

    #[test]
    fn permission_errors_are_forbidden() {
        assert_eq!(AuthError::InsufficientPermissions.status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::MissingToken.status(), StatusCode::UNAUTHORIZED);
    }
}
