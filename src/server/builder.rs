//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::AppConfig;
use crate::core::auth::{CredentialVerifier, DenyAllVerifier};
use crate::core::service::SessionStore;
use crate::storage::{InMemorySessionStore, StaticCredentialStore};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Upper bound on the time between idle-session sweeps
const SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Builder for the order service
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(AppConfig::from_yaml_file("nursery.yaml")?)
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    sessions: Option<Arc<dyn SessionStore>>,
    verifier: Option<Arc<dyn CredentialVerifier>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            sessions: None,
            verifier: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a session store other than the in-memory default
    pub fn with_session_store(mut self, store: impl SessionStore + 'static) -> Self {
        self.sessions = Some(Arc::new(store));
        self
    }

    /// Inject the credential verifier
    ///
    /// Takes precedence over `users_file` from the config.
    pub fn with_credential_verifier(mut self, verifier: impl CredentialVerifier + 'static) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    fn resolve_verifier(&mut self) -> Result<Arc<dyn CredentialVerifier>> {
        if let Some(verifier) = self.verifier.take() {
            return Ok(verifier);
        }
        match &self.config.users_file {
            Some(path) => {
                let store = StaticCredentialStore::from_yaml_file(path)?;
                tracing::info!(users = store.len(), path = %path.display(), "user store loaded");
                Ok(Arc::new(store))
            }
            None => {
                tracing::warn!("no user store configured, every login will be rejected");
                Ok(Arc::new(DenyAllVerifier))
            }
        }
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        self.config.validate()?;
        let verifier = self.resolve_verifier()?;
        let sessions = self
            .sessions
            .take()
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new()));

        Ok(ServerHost::new(self.config, sessions, verifier))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Serve on the configured address with graceful shutdown
    ///
    /// Idle sessions are swept in the background while the server runs.
    pub async fn serve(mut self) -> Result<()> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let addr = host.config.bind_addr.clone();

        let sweeper = spawn_session_sweeper(
            host.sessions.clone(),
            host.config.session_idle_timeout(),
        );
        let app = RestExposure::build_router(host, custom_routes)?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();
        served?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Periodically drop sessions idle for longer than `max_idle`
fn spawn_session_sweeper(sessions: Arc<dyn SessionStore>, max_idle: Duration) -> JoinHandle<()> {
    let period = max_idle.min(SWEEP_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match sessions.purge_idle(max_idle).await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "idle sessions expired"),
                Err(e) => tracing::warn!(error = %e, "session sweep failed"),
            }
        }
    })
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
