//! Direct messages between two users

use super::{load_user, take_notices, PageResult};
use crate::auth::CurrentActor;
use crate::error::PageError;
use crate::flash;
use crate::templates::{page_title, render, MessageView, MessagesTemplate, Nav, UserView};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use bookmarket_core::{Gate, MessageForm, UserId, UserMessage};

fn parse_user_id(raw: &str) -> Result<UserId, PageError> {
    raw.parse::<UserId>().map_err(|_| PageError::NotFound)
}

/// Conversation between the signed-in user and `user_id`, oldest first
pub async fn conversation(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<String>,
    jar: CookieJar,
) -> PageResult {
    let me = Gate::new(&actor).require_authenticated().finish()?;
    let other = load_user(&state, parse_user_id(&user_id)?).await?;

    let messages = state.database.conversation(me.id, other.id).await?;
    let (jar, notices) = take_notices(jar);

    let page = render(&MessagesTemplate {
        title: page_title(&format!("Messages with {}", other.name)),
        nav: Nav::from(&actor),
        notices,
        other_user: UserView::from(&other),
        conversation: messages
            .iter()
            .map(|m| MessageView::new(m, me.id))
            .collect(),
    })?;
    Ok((jar, page))
}

/// Send a message. Blank messages are dropped without a notice.
pub async fn send(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Result<Response, PageError> {
    let me = Gate::new(&actor).require_authenticated().finish()?;
    let other = load_user(&state, parse_user_id(&user_id)?).await?;
    let back = format!("/messages/{}", other.id);

    let Some(text) = form.text() else {
        return Ok(Redirect::to(&back).into_response());
    };

    state.database.send_message(me.id, other.id, &text).await?;
    Ok(flash::redirect(&back, UserMessage::new("Message sent.")))
}
