//! HTTP router with Swagger UI

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::FromRef,
    middleware,
    Extension,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{AuditLogger, FuelCalculatorService, SettingsStore};
use crate::config::AppConfig;
use crate::domain::CalculationResult;
use crate::interfaces::http::common::{ApiResponse, TrustedProxies};
use crate::interfaces::http::middleware::{
    admin_middleware, auth_middleware, optional_auth_middleware, AuthState,
};
use crate::interfaces::http::modules::{
    auth, calculator, form, health, metrics, request_id, settings,
};

/// Unified router state. Each handler keeps its own `State<T>` extractor;
/// axum derives it through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FuelCalculatorService>,
    pub settings: Arc<SettingsStore>,
    pub sessions: Arc<form::FormSessions>,
    pub auth: AuthState,
    pub trusted_proxies: TrustedProxies,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        audit: Arc<dyn AuditLogger>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            service: Arc::new(FuelCalculatorService::new(audit)),
            settings,
            sessions: Arc::new(form::FormSessions::new(Duration::from_secs(
                config.calculator.session_ttl_secs,
            ))),
            auth: AuthState::from_config(&config.security),
            trusted_proxies: TrustedProxies::new(config.server.trusted_proxies.clone()),
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<AppState> for calculator::CalculatorState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            service: Arc::clone(&s.service),
        }
    }
}

impl FromRef<AppState> for form::FormState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            service: Arc::clone(&s.service),
            settings: Arc::clone(&s.settings),
            sessions: Arc::clone(&s.sessions),
        }
    }
}

impl FromRef<AppState> for settings::SettingsState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            store: Arc::clone(&s.settings),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            started_at: Arc::clone(&s.started_at),
            sessions: Arc::clone(&s.sessions),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /api/v1/auth/login"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::get_current_user,
        calculator::calculate,
        form::show_form,
        form::submit_form,
        form::reset_form,
        settings::get_settings,
        settings::update_settings,
    ),
    components(
        schemas(
            ApiResponse<String>,
            CalculationResult,
            calculator::CalculateRequest,
            calculator::CalculateErrorResponse,
            calculator::FieldErrorDto,
            form::FormSubmission,
            form::FormView,
            form::FormFieldView,
            form::FormResultsView,
            settings::SettingsResponse,
            settings::UpdateSettingsRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Login (JWT) and current user"),
        (name = "Calculator", description = "Fuel consumption and cost calculation"),
        (name = "Form", description = "Calculator form view model with per-session results"),
        (name = "Settings", description = "Form prefill defaults"),
    ),
    info(
        title = "Fuel Calculator API",
        version = "1.0.0",
        description = "Fuel spent and fuel cost for a trip",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the full HTTP router.
///
/// `/metrics` is only mounted when a Prometheus recorder is installed.
pub fn create_router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let require_auth = middleware::from_fn_with_state(state.auth.clone(), auth_middleware);

    // JWT or API key required
    let protected_routes = Router::<AppState>::new()
        .route("/api/fuel-calculate", post(calculator::calculate))
        .route("/api/v1/auth/me", get(auth::get_current_user))
        .route(
            "/api/v1/settings",
            get(settings::get_settings).merge(
                put(settings::update_settings).layer(middleware::from_fn(admin_middleware)),
            ),
        )
        .layer(require_auth);

    // Anonymous allowed; credentials, when valid, name the actor in the audit log
    let form_routes = Router::<AppState>::new()
        .route(
            "/fuel-calculator",
            get(form::show_form).post(form::submit_form),
        )
        .route("/fuel-calculator/block", get(form::show_form))
        .route("/fuel-calculator/reset", post(form::reset_form))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            optional_auth_middleware,
        ));

    let public_routes = Router::<AppState>::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/auth/login", post(auth::login));

    let trusted_proxies = state.trusted_proxies.clone();

    let mut router: Router = Router::<AppState>::new()
        .merge(protected_routes)
        .merge(form_routes)
        .merge(public_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if let Some(handle) = prometheus {
        let metrics_routes: Router = Router::new()
            .route("/metrics", get(metrics::prometheus_metrics))
            .with_state(metrics::MetricsState { handle });
        router = router.merge(metrics_routes);
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(Extension(trusted_proxies))
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::audit::testing::RecordingAuditLogger;
    use crate::application::{EntryPoint, ANONYMOUS};
    use crate::config::UserConfig;
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::crypto::password::hash_password_with_cost;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use std::net::SocketAddr;
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::Service;

    struct TestApp {
        router: Router,
        state: AppState,
        audit: Arc<RecordingAuditLogger>,
    }

    impl TestApp {
        fn new() -> Self {
            let mut config = AppConfig::default();
            config.server.trusted_proxies = vec!["10.0.0.1".parse().unwrap()];
            let hash = hash_password_with_cost("secret", 4).unwrap();
            for (username, role) in [("admin", "admin"), ("alice", "operator")] {
                config.security.users.push(UserConfig {
                    username: username.to_string(),
                    password_hash: hash.clone(),
                    role: role.to_string(),
                });
            }

            let audit = Arc::new(RecordingAuditLogger::default());
            let settings = Arc::new(SettingsStore::new(config.clone()));
            let state = AppState::new(&config, audit.clone(), settings);
            Self {
                router: create_router(state.clone(), None),
                state,
                audit,
            }
        }

        fn token(&self, username: &str, role: &str) -> String {
            create_token(username, role, &self.state.auth.jwt_config).unwrap()
        }

        async fn send(&self, request: Request<Body>) -> Response {
            let mut svc = self.router.clone().into_service();
            svc.call(request).await.unwrap()
        }
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn form_request(body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/fuel-calculator")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// `name=value` part of the `Set-Cookie` header.
    fn session_cookie(resp: &Response) -> String {
        let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    const TRIP: &str = r#"{"distance": 100, "fuel_consumption": 8, "fuel_price": 1.5}"#;

    #[tokio::test]
    async fn rest_requires_credentials() {
        let app = TestApp::new();
        let resp = app.send(json_request("POST", "/api/fuel-calculate", None, TRIP)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(app.audit.taken().is_empty());
    }

    #[tokio::test]
    async fn credentials_are_checked_before_the_body() {
        let app = TestApp::new();
        let resp = app
            .send(json_request("POST", "/api/fuel-calculate", None, "not json"))
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rest_calculates_and_audits() {
        let app = TestApp::new();
        let token = app.token("alice", "operator");
        let resp = app
            .send(json_request("POST", "/api/fuel-calculate", Some(&token), TRIP))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(request_id::REQUEST_ID_HEADER));

        let body = body_json(resp).await;
        assert_eq!(body, json!({"fuel_spent": "8,0", "fuel_cost": "12,0"}));

        let records = app.audit.taken();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry_point, EntryPoint::Rest);
        assert_eq!(records[0].actor, "alice");
    }

    #[tokio::test]
    async fn rest_accepts_numeric_strings() {
        let app = TestApp::new();
        let token = app.token("alice", "operator");
        let body = r#"{"distance": "250", "fuel_consumption": "6.4", "fuel_price": "1.79"}"#;
        let resp = app
            .send(json_request("POST", "/api/fuel-calculate", Some(&token), body))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["fuel_spent"], "16,0");
        assert_eq!(body["fuel_cost"], "28,6");
    }

    #[tokio::test]
    async fn rest_rejects_out_of_range_with_bounds() {
        let app = TestApp::new();
        let token = app.token("alice", "operator");
        let body = r#"{"distance": 50000, "fuel_consumption": 8, "fuel_price": 1.5}"#;
        let resp = app
            .send(json_request("POST", "/api/fuel-calculate", Some(&token), body))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Distance"));
        assert!(message.contains("10000"));
        assert_eq!(body["errors"][0]["field"], "distance");
        assert_eq!(body["errors"][0]["code"], "out_of_range");
        assert!(app.audit.taken().is_empty());
    }

    #[tokio::test]
    async fn rest_reports_every_invalid_field() {
        let app = TestApp::new();
        let token = app.token("alice", "operator");
        let body = r#"{"distance": "abc", "fuel_price": 0}"#;
        let resp = app
            .send(json_request("POST", "/api/fuel-calculate", Some(&token), body))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        let codes: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, ["non_numeric", "missing_field", "out_of_range"]);
    }

    #[tokio::test]
    async fn rest_rejects_malformed_json() {
        let app = TestApp::new();
        let token = app.token("alice", "operator");
        let resp = app
            .send(json_request("POST", "/api/fuel-calculate", Some(&token), "{"))
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["message"].is_string());
    }

    #[tokio::test]
    async fn form_starts_from_defaults() {
        let app = TestApp::new();
        let resp = app.send(get_request("/fuel-calculator?distance=42", None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::SET_COOKIE));

        let view: form::FormView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view.field("distance").unwrap().value, "42");
        assert_eq!(view.field("fuel_consumption").unwrap().value, "7");
        assert_eq!(view.field("fuel_price").unwrap().value, "1.8");
        assert_eq!(view.results.fuel_spent, form::RESULT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn form_result_survives_in_session_until_reset() {
        let app = TestApp::new();
        let resp = app
            .send(form_request("distance=100&fuel_consumption=8&fuel_price=1.5", None))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp);
        assert!(cookie.starts_with(form::SESSION_COOKIE));

        let view: form::FormView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view.results.fuel_spent, "8,0");
        assert_eq!(view.results.fuel_cost, "12,0");

        let records = app.audit.taken();
        assert_eq!(records[0].entry_point, EntryPoint::Form);
        assert_eq!(records[0].actor, ANONYMOUS);

        let resp = app.send(get_request("/fuel-calculator/block", Some(&cookie))).await;
        assert!(!resp.headers().contains_key(header::SET_COOKIE));
        let view: form::FormView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view.results.fuel_cost, "12,0");

        let reset = Request::builder()
            .method("POST")
            .uri("/fuel-calculator/reset")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(reset).await.status(), StatusCode::OK);

        let resp = app.send(get_request("/fuel-calculator", Some(&cookie))).await;
        let view: form::FormView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view.results.fuel_spent, form::RESULT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn form_marks_invalid_fields() {
        let app = TestApp::new();
        let resp = app
            .send(form_request("distance=0&fuel_consumption=8&fuel_price=abc", None))
            .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let view: form::FormView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view.field("distance").unwrap().value, "0");
        assert!(view.field("distance").unwrap().error.is_some());
        assert!(view.field("fuel_consumption").unwrap().error.is_none());
        assert!(view.field("fuel_price").unwrap().error.is_some());
        assert_eq!(view.results.fuel_spent, form::RESULT_PLACEHOLDER);
        assert!(app.audit.taken().is_empty());
    }

    #[tokio::test]
    async fn form_names_logged_in_actor() {
        let app = TestApp::new();
        let token = app.token("alice", "operator");
        let request = Request::builder()
            .method("POST")
            .uri("/fuel-calculator")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from("distance=10&fuel_consumption=5&fuel_price=2"))
            .unwrap();
        assert_eq!(app.send(request).await.status(), StatusCode::OK);
        assert_eq!(app.audit.taken()[0].actor, "alice");
    }

    fn form_request_from(peer: &str, forwarded_for: &str) -> Request<Body> {
        let mut request = form_request("distance=10&fuel_consumption=5&fuel_price=2", None);
        request
            .headers_mut()
            .insert("x-forwarded-for", forwarded_for.parse().unwrap());
        request
            .extensions_mut()
            .insert(ConnectInfo::<SocketAddr>(peer.parse().unwrap()));
        request
    }

    #[tokio::test]
    async fn audit_ignores_forwarded_for_from_untrusted_peer() {
        let app = TestApp::new();
        let resp = app.send(form_request_from("203.0.113.7:5000", "6.6.6.6")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(app.audit.taken()[0].source_address, "203.0.113.7");
    }

    #[tokio::test]
    async fn audit_believes_forwarded_for_from_trusted_proxy() {
        let app = TestApp::new();
        let resp = app.send(form_request_from("10.0.0.1:5000", "198.51.100.20")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(app.audit.taken()[0].source_address, "198.51.100.20");
    }

    #[tokio::test]
    async fn login_issues_usable_token() {
        let app = TestApp::new();
        let resp = app
            .send(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                r#"{"username": "alice", "password": "secret"}"#,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["token_type"], "Bearer");
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let resp = app
            .send(json_request("GET", "/api/v1/auth/me", Some(&token), ""))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["username"], "alice");
    }

    #[tokio::test]
    async fn login_rejects_bad_password() {
        let app = TestApp::new();
        let resp = app
            .send(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                r#"{"username": "alice", "password": "nope"}"#,
            ))
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn settings_update_is_admin_only() {
        let app = TestApp::new();
        let update = r#"{"default_distance": 250, "default_fuel_consumption": 6.5, "default_fuel_price": 1.9}"#;

        let operator = app.token("alice", "operator");
        let resp = app
            .send(json_request("PUT", "/api/v1/settings", Some(&operator), update))
            .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = app
            .send(json_request("GET", "/api/v1/settings", Some(&operator), ""))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let admin = app.token("admin", "admin");
        let resp = app
            .send(json_request("PUT", "/api/v1/settings", Some(&admin), update))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["default_distance"], 250.0);

        let resp = app.send(get_request("/fuel-calculator", None)).await;
        let view: form::FormView = serde_json::from_value(body_json(resp).await).unwrap();
        assert_eq!(view.field("distance").unwrap().value, "250");
    }

    #[tokio::test]
    async fn settings_reject_out_of_range_defaults() {
        let app = TestApp::new();
        let admin = app.token("admin", "admin");
        let update = r#"{"default_distance": 0, "default_fuel_consumption": 6.5, "default_fuel_price": 1.9}"#;
        let resp = app
            .send(json_request("PUT", "/api/v1/settings", Some(&admin), update))
            .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error = body_json(resp).await["error"].as_str().unwrap().to_string();
        assert_eq!(error, "Distance must be between 0.1 and 10000");
        assert_eq!(app.state.settings.defaults().await.default_distance, 100.0);
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new();
        let resp = app.send(get_request("/health", None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }
}
