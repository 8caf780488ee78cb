//! Request actors
//!
//! An [`Actor`] is constructed fresh for every request from session state.
//! It is either anonymous or carries the [`Identity`] of a registered user.

use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Marketplace role chosen at registration
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses the catalog and messages sellers
    Buyer,
    /// Additionally lists books for sale
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Identity of an authenticated actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
}

/// The identity context resolved for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor {
    identity: Option<Identity>,
}

impl Actor {
    /// Actor for a request without a valid session
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    /// Actor for a signed-in user
    pub fn authenticated(id: UserId, role: Role) -> Self {
        Self {
            identity: Some(Identity { id, role }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn id(&self) -> Option<UserId> {
        self.identity.map(|i| i.id)
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.map(|i| i.role)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity
    }
}
