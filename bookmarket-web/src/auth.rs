//! Session-based authentication
//!
//! The session cookie carries a signed token naming the user. Every request
//! resolves it into an [`Actor`] through the [`CurrentActor`] extractor;
//! access checks then run explicitly inside each handler.

pub mod handlers;
pub mod session;

use crate::AppState;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use bookmarket_core::{Actor, UserId};
use std::convert::Infallible;
use tracing::debug;

pub use session::{SessionError, SessionManager, SESSION_COOKIE};

/// The actor for the current request, anonymous when there is no valid session
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let user_id = session_user(&jar, &app_state.sessions);
        let actor = app_state.resolve_actor(user_id).await;

        Ok(CurrentActor(actor))
    }
}

/// User id named by the request's session cookie, if it carries a valid token
pub fn session_user(jar: &CookieJar, sessions: &SessionManager) -> Option<UserId> {
    let token = jar.get(SESSION_COOKIE)?;
    match sessions.verify(token.value()) {
        Ok(user_id) => Some(user_id),
        Err(e) => {
            debug!("Ignoring session cookie: {}", e);
            None
        }
    }
}
