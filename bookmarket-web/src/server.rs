//! Bookmarket Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use bookmarket_core::AppConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Bookmarket web server
pub struct BookmarketServer {
    config: AppConfig,
    state: AppState,
}

impl BookmarketServer {
    /// Create a new server, connecting to the configured database
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Bind the configured address and serve until shutdown
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> WebResult<()> {
        let address = listener.local_addr().map_err(WebError::Server)?;

        info!("Starting Bookmarket Web Server");
        info!("Development mode: {}", self.config.server.dev_mode);
        info!("Server listening on http://{}", address);

        let app = create_app(self.state);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for BookmarketServer
pub struct BookmarketServerBuilder {
    config: AppConfig,
}

impl BookmarketServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.server.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database.url = database_url.into();
        self
    }

    /// Build the server; the configuration is validated with the state
    pub async fn build(self) -> WebResult<BookmarketServer> {
        BookmarketServer::new(self.config).await
    }
}

impl Default for BookmarketServerBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
