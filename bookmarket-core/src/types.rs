//! Persisted marketplace records

use crate::actor::Role;
use crate::access::ProtectedResource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type BookId = i64;
pub type MessageId = i64;

/// A registered user, including the stored password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub contact: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }
}

/// Data needed to create a user record
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub password_hash: String,
    pub role: Role,
}

/// A book listed for sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub condition: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub seller_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl ProtectedResource for Book {
    fn owner_id(&self) -> UserId {
        self.seller_id
    }
}

/// Validated listing fields, shared by create and update
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub condition: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
}

/// A direct message between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub message_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Catalog filter. Empty fields do not constrain the listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author
    pub author: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
}

impl BookFilter {
    /// No field constrains the listing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
