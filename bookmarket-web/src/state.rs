//! Shared application state

use crate::auth::SessionManager;
use crate::database::Database;
use crate::WebResult;
use bookmarket_core::{Actor, AppConfig, IdentityResolver, UserId};
use std::sync::Arc;
use tracing::{info, warn};

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: Database,
    pub sessions: SessionManager,
}

impl AppState {
    /// Connect to the database and prepare the session keys
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        info!("Initializing application state");
        config.validate()?;

        if config.session.uses_default_secret() && !config.server.dev_mode {
            warn!("Using the built-in session secret; set BOOKMARKET__SESSION__SECRET");
        }

        let database = Database::connect(&config.database).await?;
        let sessions = SessionManager::new(&config.session);

        Ok(Self {
            config: Arc::new(config),
            database,
            sessions,
        })
    }

    /// Actor for a request whose session names `session_user`
    pub async fn resolve_actor(&self, session_user: Option<UserId>) -> Actor {
        IdentityResolver::new(&self.database)
            .resolve(session_user)
            .await
    }
}
