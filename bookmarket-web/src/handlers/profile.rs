//! Profile page and profile editing

use super::{load_user, take_notices, PageResult};
use crate::auth::CurrentActor;
use crate::error::PageError;
use crate::flash;
use crate::templates::{
    page_title, render, BookView, EditProfileTemplate, Nav, ProfileTemplate, UserView,
};
use crate::AppState;
use axum::{extract::State, response::Response, Form};
use axum_extra::extract::cookie::CookieJar;
use bookmarket_core::{CredentialStore, Gate, ProfileForm, UserMessage};
use tracing::info;

/// The signed-in user's details; sellers also see their listings
pub async fn show(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    jar: CookieJar,
) -> PageResult {
    let me = Gate::new(&actor).require_authenticated().finish()?;
    let user = load_user(&state, me.id).await?;

    let books = if user.is_seller() {
        state.database.books_by_seller(user.id).await?
    } else {
        Vec::new()
    };
    let (jar, notices) = take_notices(jar);

    let page = render(&ProfileTemplate {
        title: page_title("Profile"),
        nav: Nav::from(&actor),
        notices,
        user: UserView::from(&user),
        is_seller: user.is_seller(),
        books: books.iter().map(|b| BookView::new(b, &actor)).collect(),
    })?;
    Ok((jar, page))
}

pub async fn edit_form(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    jar: CookieJar,
) -> PageResult {
    let me = Gate::new(&actor).require_authenticated().finish()?;
    let user = load_user(&state, me.id).await?;
    let (jar, notices) = take_notices(jar);

    let page = render(&EditProfileTemplate {
        title: page_title("Edit profile"),
        nav: Nav::from(&actor),
        notices,
        user: UserView::from(&user),
    })?;
    Ok((jar, page))
}

pub async fn edit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Form(form): Form<ProfileForm>,
) -> Result<Response, PageError> {
    let me = Gate::new(&actor).require_authenticated().finish()?;

    let update = form
        .validate()
        .map_err(|e| PageError::invalid("/profile/edit", e))?;

    state
        .database
        .update_profile(me.id, &update.name, &update.contact)
        .await?;
    info!("User {} updated their profile", me.id);

    Ok(flash::redirect(
        "/profile",
        UserMessage::new("Profile updated successfully."),
    ))
}
