//! HTTP request handlers for the Bookmarket web server
//!
//! Every handler takes the current actor explicitly, runs its access checks
//! through a [`Gate`](bookmarket_core::Gate) before touching storage, and
//! returns either a page or a [`PageError`].

pub mod books;
pub mod health;
pub mod messages;
pub mod profile;

use crate::auth::CurrentActor;
use crate::error::PageError;
use crate::flash;
use crate::templates::{page_title, render, IndexTemplate, Nav, UserView};
use crate::AppState;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use bookmarket_core::{CredentialStore, Gate, MarketError, User, UserId};

/// Page handler result: the jar carries the consumed flash notice
pub type PageResult = Result<(CookieJar, Html<String>), PageError>;

/// Pending notice for the page being rendered, as the template expects it
pub(crate) fn take_notices(jar: CookieJar) -> (CookieJar, Vec<String>) {
    let (jar, notice) = flash::take(jar);
    (jar, notice.into_iter().collect())
}

/// Load a user that must exist
pub(crate) async fn load_user(state: &AppState, id: UserId) -> Result<User, PageError> {
    state
        .database
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| MarketError::not_found("User", id).into())
}

/// Home page
pub async fn home(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    jar: CookieJar,
) -> PageResult {
    let identity = Gate::new(&actor).require_authenticated().finish()?;
    let user = load_user(&state, identity.id).await?;
    let (jar, notices) = take_notices(jar);

    let page = render(&IndexTemplate {
        title: page_title("Home"),
        nav: Nav::from(&actor),
        notices,
        user: UserView::from(&user),
    })?;
    Ok((jar, page))
}

/// Fallback for unknown routes
pub async fn not_found() -> Response {
    PageError::NotFound.into_response()
}
