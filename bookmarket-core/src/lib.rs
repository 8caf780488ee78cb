//! Bookmarket Core - domain model, access control and validation
//!
//! This crate holds everything about the marketplace that does not depend on
//! HTTP: who the current actor is, whether the actor may perform an
//! operation, and whether submitted form data is acceptable.

pub mod access;
pub mod actor;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod notice;
pub mod session;
pub mod types;
pub mod validation;

pub use access::*;
pub use actor::*;
pub use crate::config::*;
pub use credentials::*;
pub use error::*;
pub use logging::*;
pub use notice::*;
pub use session::*;
pub use types::*;
pub use validation::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
