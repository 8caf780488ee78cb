//! Session/identity resolution
//!
//! Turns the user id recovered from a session token into the [`Actor`] for
//! the request. Absence of identity is a normal outcome, so resolution never
//! fails: anything that prevents establishing a signed-in user yields the
//! anonymous actor.

use crate::actor::Actor;
use crate::credentials::CredentialStore;
use crate::types::UserId;
use tracing::{debug, warn};

pub struct IdentityResolver<'s, S: CredentialStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: CredentialStore + ?Sized> IdentityResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Resolve the actor for a session. `session_user` is `None` when the
    /// request carried no valid session token.
    ///
    /// The role always comes from the stored user record, never from the
    /// session, so a role change applies on the next request.
    pub async fn resolve(&self, session_user: Option<UserId>) -> Actor {
        let Some(user_id) = session_user else {
            return Actor::anonymous();
        };

        match self.store.find_user_by_id(user_id).await {
            Ok(Some(user)) => {
                debug!("Resolved session user {} as {}", user.id, user.role);
                Actor::authenticated(user.id, user.role)
            }
            Ok(None) => {
                debug!("Session names unknown user {}", user_id);
                Actor::anonymous()
            }
            Err(e) => {
                warn!("Failed to resolve session user {}: {}", user_id, e);
                Actor::anonymous()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Role;
    use crate::credentials::{hash_password, MemoryCredentialStore};
    use crate::error::{MarketError, MarketResult};
    use crate::types::{NewUser, User};
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl CredentialStore for FailingStore {
        async fn find_user_by_id(&self, _id: UserId) -> MarketResult<Option<User>> {
            Err(MarketError::Storage("database is locked".to_string()))
        }

        async fn find_user_by_email(&self, _email: &str) -> MarketResult<Option<User>> {
            Err(MarketError::Storage("database is locked".to_string()))
        }

        async fn create_user(&self, _user: NewUser) -> MarketResult<User> {
            Err(MarketError::Storage("database is locked".to_string()))
        }

        async fn update_profile(&self, _id: UserId, _n: &str, _c: &str) -> MarketResult<()> {
            Err(MarketError::Storage("database is locked".to_string()))
        }
    }

    async fn seller_store() -> (MemoryCredentialStore, UserId) {
        let store = MemoryCredentialStore::new();
        let user = store
            .create_user(NewUser {
                name: "Seller".to_string(),
                email: "seller@example.com".to_string(),
                contact: String::new(),
                password_hash: hash_password("password1").unwrap(),
                role: Role::Seller,
            })
            .await
            .unwrap();
        (store, user.id)
    }

    #[tokio::test]
    async fn test_no_session_is_anonymous() {
        let (store, _) = seller_store().await;
        let actor = IdentityResolver::new(&store).resolve(None).await;
        assert_eq!(actor, Actor::anonymous());
    }

    #[tokio::test]
    async fn test_known_user_is_authenticated_with_stored_role() {
        let (store, id) = seller_store().await;
        let actor = IdentityResolver::new(&store).resolve(Some(id)).await;
        assert_eq!(actor, Actor::authenticated(id, Role::Seller));
    }

    #[tokio::test]
    async fn test_unknown_user_is_anonymous() {
        let (store, id) = seller_store().await;
        let actor = IdentityResolver::new(&store).resolve(Some(id + 100)).await;
        assert!(!actor.is_authenticated());
    }

    #[tokio::test]
    async fn test_store_failure_is_anonymous() {
        let actor = IdentityResolver::new(&FailingStore).resolve(Some(1)).await;
        assert!(!actor.is_authenticated());
    }
}
