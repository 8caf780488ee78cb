//! Credential store and password hashing

use crate::error::{MarketError, MarketResult};
use crate::types::{NewUser, User, UserId};
use crate::validation::ValidationError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Storage of user identity records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> MarketResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> MarketResult<Option<User>>;

    /// Create a user. A duplicate email fails with
    /// [`ValidationError::EmailTaken`].
    async fn create_user(&self, user: NewUser) -> MarketResult<User>;

    async fn update_profile(&self, id: UserId, name: &str, contact: &str) -> MarketResult<()>;
}

/// Hash password using Argon2
pub fn hash_password(password: &str) -> MarketResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MarketError::Password(e.to_string()))
}

/// Verify a plaintext password against the user's stored hash.
/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(user: &User, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(&user.password_hash) else {
        debug!("Stored password hash for user {} is malformed", user.id);
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[derive(Debug, Default)]
struct MemoryUsers {
    next_id: UserId,
    users: HashMap<UserId, User>,
    ids_by_email: HashMap<String, UserId>,
}

/// In-memory credential store (for development and testing)
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<RwLock<MemoryUsers>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> MarketError {
        MarketError::Storage("credential store lock poisoned".to_string())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user_by_id(&self, id: UserId) -> MarketResult<Option<User>> {
        let inner = self.inner.read().map_err(Self::poisoned)?;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> MarketResult<Option<User>> {
        let inner = self.inner.read().map_err(Self::poisoned)?;
        Ok(inner
            .ids_by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> MarketResult<User> {
        let mut inner = self.inner.write().map_err(Self::poisoned)?;

        if inner.ids_by_email.contains_key(&user.email) {
            return Err(ValidationError::EmailTaken.into());
        }

        inner.next_id += 1;
        let record = User {
            id: inner.next_id,
            name: user.name,
            email: user.email,
            contact: user.contact,
            password_hash: user.password_hash,
            role: user.role,
            created_at: chrono::Utc::now(),
        };

        inner.ids_by_email.insert(record.email.clone(), record.id);
        inner.users.insert(record.id, record.clone());

        info!("Registered new user: {} ({})", record.id, record.role);
        Ok(record)
    }

    async fn update_profile(&self, id: UserId, name: &str, contact: &str) -> MarketResult<()> {
        let mut inner = self.inner.write().map_err(Self::poisoned)?;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or(MarketError::not_found("User", id))?;
        user.name = name.to_string();
        user.contact = contact.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Role;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            contact: String::new(),
            password_hash: hash_password(password).unwrap(),
            role: Role::Buyer,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryCredentialStore::new();
        let user = store
            .create_user(new_user("a@example.com", "password1"))
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        let by_id = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@example.com");
        let by_email = store.find_user_by_email("a@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
        assert!(store.find_user_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryCredentialStore::new();
        store
            .create_user(new_user("a@example.com", "password1"))
            .await
            .unwrap();
        let err = store
            .create_user(new_user("a@example.com", "password2"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarketError::Validation(ValidationError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_verify_password() {
        let store = MemoryCredentialStore::new();
        let user = store
            .create_user(new_user("a@example.com", "password1"))
            .await
            .unwrap();

        assert!(verify_password(&user, "password1"));
        assert!(!verify_password(&user, "password2"));

        let mut broken = user.clone();
        broken.password_hash = "not-a-hash".to_string();
        assert!(!verify_password(&broken, "password1"));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = MemoryCredentialStore::new();
        let user = store
            .create_user(new_user("a@example.com", "password1"))
            .await
            .unwrap();

        store
            .update_profile(user.id, "Renamed", "555-0199")
            .await
            .unwrap();
        let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.name, "Renamed");
        assert_eq!(user.contact, "555-0199");

        assert!(store.update_profile(42, "x", "").await.is_err());
    }
}
