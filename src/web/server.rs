//! Web server lifecycle: bind, serve, shut down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::{PortalError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// How often expired admin sessions are purged.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// HTTP front of the portal.
pub struct WebServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    router: Router,
}

impl WebServer {
    /// Prepare a server for `config.host:config.port`.
    ///
    /// The router is built here, so origin settings are fixed for the
    /// server's lifetime.
    pub fn new(config: &ServerConfig, app_state: AppState, cors_origins: &[String]) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| PortalError::Config(format!("invalid server address: {e}")))?;

        let state = Arc::new(app_state);
        let router = create_router(Arc::clone(&state), cors_origins);

        Ok(Self {
            addr,
            state,
            router,
        })
    }

    /// Configured listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Drop expired admin sessions periodically.
    fn spawn_session_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            interval.tick().await;

            loop {
                interval.tick().await;
                let removed = state.sessions.cleanup_expired();
                if removed > 0 {
                    tracing::info!(removed, "Purged expired admin sessions");
                }
            }
        })
    }

    async fn listen(&self) -> std::io::Result<TcpListener> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            files = %self.state.intake.public_prefix(),
            "Document portal listening"
        );
        Ok(listener)
    }

    /// Serve until Ctrl-C, then drain in-flight requests.
    ///
    /// Uploads still streaming when the signal arrives either finish or
    /// are discarded from the holding area.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = self.listen().await?;
        let sweeper = Self::spawn_session_sweeper(Arc::clone(&self.state));

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Cannot listen for Ctrl-C; running until killed");
                    std::future::pending::<()>().await;
                }
                tracing::info!("Shutdown requested, draining connections");
            })
            .await;

        sweeper.abort();
        result
    }

    /// Serve in a background task and return the bound address.
    ///
    /// Bind to port 0 to let the OS pick one.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let listener = self.listen().await?;
        let local_addr = listener.local_addr()?;
        Self::spawn_session_sweeper(Arc::clone(&self.state));

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, self.router).await {
                tracing::error!(error = %e, "Web server stopped");
            }
        });

        Ok(local_addr)
    }
}
