//! Form validation
//!
//! Every form submitted to the marketplace is parsed into one of the structs
//! below and validated here. A [`ValidationError`] is always recoverable: the
//! handler re-renders the form with the error's message as a notice.

use crate::actor::Role;
use crate::types::{BookDraft, BookFilter};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email pattern compiles"));

/// Any Unicode decimal digit
static DIGIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("digit pattern compiles"));

const MIN_PASSWORD_CHARS: usize = 8;

/// Malformed or incomplete input. The message is shown to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill out all required fields.")]
    MissingRequiredFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Password must be at least 8 characters long and contain a number.")]
    WeakPassword,

    #[error("Please choose either buyer or seller.")]
    InvalidRole,

    #[error("Email already registered.")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please provide both title and price.")]
    MissingListingFields,

    #[error("Title and price are required.")]
    MissingListingFieldsOnEdit,

    #[error("Price must be a number.")]
    InvalidPrice,

    #[error("Price filters must be valid numbers.")]
    InvalidPriceFilter,

    #[error("Name cannot be empty.")]
    EmptyName,
}

/// Registration form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub password: String,
    pub password_confirm: String,
    pub role: String,
}

/// Registration that passed validation; the password is still plaintext
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub password: String,
    pub role: Role,
}

impl RegistrationForm {
    /// Checks run in a fixed order and the first failure is reported.
    /// Whether the email is already taken is left to the credential store.
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();

        if name.is_empty()
            || email.is_empty()
            || self.password.is_empty()
            || self.password_confirm.is_empty()
        {
            return Err(ValidationError::MissingRequiredFields);
        }

        if self.password != self.password_confirm {
            return Err(ValidationError::PasswordMismatch);
        }

        if !EMAIL_PATTERN.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }

        if !is_strong_password(&self.password) {
            return Err(ValidationError::WeakPassword);
        }

        let role = self
            .role
            .parse::<Role>()
            .map_err(|_| ValidationError::InvalidRole)?;

        Ok(Registration {
            name: name.to_string(),
            email: email.to_string(),
            contact: self.contact.trim().to_string(),
            password: self.password.clone(),
            role,
        })
    }
}

/// At least eight characters, one of them a digit
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS && DIGIT_PATTERN.is_match(password)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Which listing form was submitted; the two word their errors differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    Create,
    Edit,
}

/// Listing form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub condition: String,
    pub price: String,
    pub image_url: String,
}

impl BookForm {
    pub fn validate(&self, mode: ListingMode) -> Result<BookDraft, ValidationError> {
        let title = self.title.trim();
        let price = self.price.trim();

        if title.is_empty() || price.is_empty() {
            return Err(match mode {
                ListingMode::Create => ValidationError::MissingListingFields,
                ListingMode::Edit => ValidationError::MissingListingFieldsOnEdit,
            });
        }

        let price = parse_price(price).ok_or(ValidationError::InvalidPrice)?;

        Ok(BookDraft {
            title: title.to_string(),
            author: optional(&self.author),
            description: optional(&self.description),
            condition: optional(&self.condition),
            price,
            image_url: optional(&self.image_url),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub contact: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfileUpdate, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(ProfileUpdate {
            name: name.to_string(),
            contact: self.contact.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub message: String,
}

impl MessageForm {
    /// Trimmed text, or `None` when there is nothing to send
    pub fn text(&self) -> Option<String> {
        optional(&self.message)
    }
}

/// Catalog query string as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub title: String,
    pub author: String,
    pub min_price: String,
    pub max_price: String,
}

impl CatalogQuery {
    /// Build the catalog filter.
    ///
    /// A bad price bound does not reject the query. The filter is applied
    /// up to the first unparseable bound and the error is returned alongside
    /// it: a bad `min_price` drops both bounds, a bad `max_price` keeps the
    /// lower one.
    pub fn to_filter(&self) -> (BookFilter, Option<ValidationError>) {
        let mut filter = BookFilter {
            title: optional(&self.title),
            author: optional(&self.author),
            ..Default::default()
        };

        let bound = |raw: &str| -> Result<Option<f64>, ValidationError> {
            match optional(raw) {
                None => Ok(None),
                Some(raw) => parse_price(&raw)
                    .map(Some)
                    .ok_or(ValidationError::InvalidPriceFilter),
            }
        };

        match bound(&self.min_price) {
            Ok(min) => filter.min_price = min,
            Err(err) => return (filter, Some(err)),
        }
        match bound(&self.max_price) {
            Ok(max) => filter.max_price = max,
            Err(err) => return (filter, Some(err)),
        }

        (filter, None)
    }
}

/// Parse a finite decimal price
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
