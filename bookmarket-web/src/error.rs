//! Request outcomes that end a handler early
//!
//! | Outcome                              | Response                      |
//! |--------------------------------------|-------------------------------|
//! | unauthenticated / forbidden role     | 403, generic forbidden page   |
//! | not the owner                        | redirect with a notice        |
//! | resource not found                   | 404 page                      |
//! | validation error                     | redirect to the form, notice  |
//! | storage, template, session failures  | 500 page                      |

use crate::flash;
use crate::templates::ErrorTemplate;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use bookmarket_core::{AccessDecision, ListingAction, MarketError, UserMessage, ValidationError};
use tracing::{error, warn};

/// Where a denied listing owner is sent
pub const CATALOG_PATH: &str = "/books";

const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this page.";
const NOT_FOUND_MESSAGE: &str = "The page you are looking for does not exist.";
const INTERNAL_MESSAGE: &str = "Something went wrong on our side. Please try again.";

#[derive(Debug)]
pub enum PageError {
    /// Authentication or role denial. Deliberately does not say which.
    Forbidden,
    NotFound,
    /// Redirect with a notice; used for ownership denials and invalid forms
    Notice {
        redirect_to: String,
        message: UserMessage,
    },
    Internal(String),
}

impl PageError {
    /// Map a gate denial for an operation on a listing
    pub fn denied(decision: AccessDecision, action: ListingAction) -> Self {
        match UserMessage::for_decision(decision, action) {
            Some(message) => PageError::Notice {
                redirect_to: CATALOG_PATH.to_string(),
                message,
            },
            None => PageError::Forbidden,
        }
    }

    /// Send the user back to `form` with the validation error as a notice
    pub fn invalid(form: impl Into<String>, err: ValidationError) -> Self {
        PageError::Notice {
            redirect_to: form.into(),
            message: err.into(),
        }
    }
}

impl From<AccessDecision> for PageError {
    fn from(decision: AccessDecision) -> Self {
        match MarketError::try_from(decision) {
            Ok(err) => err.into(),
            Err(allowed) => PageError::Internal(format!("{} is not a denial", allowed)),
        }
    }
}

impl From<MarketError> for PageError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Unauthenticated | MarketError::ForbiddenRole => PageError::Forbidden,
            MarketError::NotOwner => PageError::denied(AccessDecision::DenyNotOwner, ListingAction::Edit),
            MarketError::ResourceNotFound { .. } => PageError::NotFound,
            MarketError::Validation(err) => PageError::Notice {
                redirect_to: "/".to_string(),
                message: err.into(),
            },
            other => PageError::Internal(other.to_string()),
        }
    }
}

impl From<crate::auth::SessionError> for PageError {
    fn from(err: crate::auth::SessionError) -> Self {
        PageError::Internal(err.to_string())
    }
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = ErrorTemplate::new(status.as_u16(), message)
        .render()
        .unwrap_or_else(|e| {
            error!("Failed to render error page: {}", e);
            message.to_string()
        });
    (status, Html(body)).into_response()
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Forbidden => error_page(StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE),
            PageError::NotFound => error_page(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            PageError::Notice {
                redirect_to,
                message,
            } => {
                warn!("Redirecting to {} with notice: {}", redirect_to, message);
                flash::redirect(&redirect_to, message)
            }
            PageError::Internal(detail) => {
                error!("Internal error: {}", detail);
                error_page(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        }
    }
}
