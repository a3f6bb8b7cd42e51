//! Server runtime
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, application
//! state, HTTP listener, the form-session sweeper and graceful shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::SettingsStore;
use crate::config::AppConfig;
use crate::infrastructure::TracingAuditLogger;
use crate::interfaces::http::modules::form::FormSessions;
use crate::interfaces::http::{create_router, AppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// How often expired form sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct ServerOptions {
    pub config: AppConfig,
    /// Where settings updates are persisted. `None` keeps them in memory.
    pub config_path: Option<PathBuf>,
}

/// Handle to a running server.
///
/// ```rust,no_run
/// use fuel_calculator::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions {
///         config: Default::default(),
///         config_path: None,
///     })
///     .await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub config: AppConfig,
    pub local_addr: SocketAddr,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    sweeper_task: JoinHandle<()>,
}

/// The global recorder can only be installed once per process; restarts
/// within the same process reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
                None
            }
        })
        .clone()
}

fn spawn_session_sweeper(sessions: Arc<FormSessions>, shutdown: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sessions.purge_expired();
                    if removed > 0 {
                        debug!(removed, "Expired form sessions swept");
                    }
                }
                _ = shutdown.wait() => break,
            }
        }
    })
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        config.validate()?;

        info!("Starting fuel calculator...");

        let prometheus = prometheus_handle();

        let settings = Arc::new(match opts.config_path {
            Some(path) => {
                info!("Settings updates persist to {}", path.display());
                SettingsStore::persistent(config.clone(), path)
            }
            None => SettingsStore::new(config.clone()),
        });

        if config.security.users.is_empty() && config.security.api_keys.is_empty() {
            warn!("No users or API keys configured; the REST endpoint will reject every request");
        }

        let state = AppState::new(&config, Arc::new(TracingAuditLogger), settings);
        let sessions = Arc::clone(&state.sessions);
        let router = create_router(state, prometheus);

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let sweeper_task = spawn_session_sweeper(sessions, shutdown.signal());

        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("HTTP server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            config,
            local_addr,
            shutdown,
            api_task,
            sweeper_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for in-flight requests after shutdown was triggered, at most
    /// `server.shutdown_timeout` seconds.
    pub async fn wait(self) {
        let Self {
            shutdown,
            api_task,
            sweeper_task,
            ..
        } = self;

        let completed = shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!("HTTP server task panicked: {}", e);
                }
                if let Err(e) = sweeper_task.await {
                    error!("Session sweeper task panicked: {}", e);
                }
            })
            .await;

        if completed {
            info!("Fuel calculator stopped");
        } else {
            warn!("Fuel calculator stopped with requests still in flight");
        }
    }

    pub async fn shutdown(self) {
        info!("Shutting down fuel calculator...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`; `logging.format = "json"` switches
/// to JSON lines. Call once, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn local_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config
    }

    #[tokio::test]
    async fn serves_health_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: local_config(),
            config_path: None,
        })
        .await
        .unwrap();
        assert_ne!(handle.local_addr.port(), 0);
        assert!(handle.is_running());

        let mut stream = tokio::net::TcpStream::connect(handle.local_addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("\"status\":\"ok\""));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_defaults_refuse_to_start() {
        let mut config = local_config();
        config.calculator.default_fuel_price = 50.0;
        let result = ServerHandle::start(ServerOptions {
            config,
            config_path: None,
        })
        .await;
        assert!(result.is_err());
    }
}
