//! Error types shared across the marketplace

use crate::access::AccessDecision;
use crate::validation::ValidationError;
use thiserror::Error;

pub type MarketResult<T> = Result<T, MarketError>;

/// Main error type for the marketplace
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Role not permitted for this operation")]
    ForbiddenRole,

    #[error("Actor does not own this resource")]
    NotOwner,

    #[error("{kind} {id} not found")]
    ResourceNotFound { kind: &'static str, id: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MarketError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::ResourceNotFound { kind, id }
    }

    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        Self::Storage(err.to_string())
    }
}

impl TryFrom<AccessDecision> for MarketError {
    type Error = AccessDecision;

    /// Convert a denial into its error. `Allow` is handed back unchanged.
    fn try_from(decision: AccessDecision) -> Result<Self, Self::Error> {
        match decision {
            AccessDecision::Allow => Err(decision),
            AccessDecision::DenyUnauthenticated => Ok(MarketError::Unauthenticated),
            AccessDecision::DenyForbiddenRole => Ok(MarketError::ForbiddenRole),
            AccessDecision::DenyNotOwner => Ok(MarketError::NotOwner),
        }
    }
}

impl From<config::ConfigError> for MarketError {
    fn from(err: config::ConfigError) -> Self {
        MarketError::Config(err.to_string())
    }
}
