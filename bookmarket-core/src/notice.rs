//! User-visible notices
//!
//! A [`UserMessage`] is the human-readable text attached to a response. It is
//! derived from a validation error or an ownership denial and travels with
//! the response that carries it.

use crate::access::AccessDecision;
use crate::validation::ValidationError;
use serde::Serialize;

/// Operation a listing owner is allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    Edit,
    Delete,
}

impl ListingAction {
    pub fn verb(&self) -> &'static str {
        match self {
            ListingAction::Edit => "edit",
            ListingAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserMessage(String);

impl UserMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn not_owner(action: ListingAction) -> Self {
        Self(format!(
            "You are not authorized to {} this book.",
            action.verb()
        ))
    }

    /// Notice for a denial.
    ///
    /// Only ownership denials are explained to the user. Authentication and
    /// role denials render the generic forbidden page, which must not reveal
    /// which check failed, so they have no message.
    pub fn for_decision(decision: AccessDecision, action: ListingAction) -> Option<Self> {
        match decision {
            AccessDecision::DenyNotOwner => Some(Self::not_owner(action)),
            _ => None,
        }
    }
}

impl From<&ValidationError> for UserMessage {
    fn from(err: &ValidationError) -> Self {
        Self(err.to_string())
    }
}

impl From<ValidationError> for UserMessage {
    fn from(err: ValidationError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for UserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
