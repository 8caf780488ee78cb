//! Template system for server-side rendering
//!
//! This module provides templates for server-side rendering using Askama.
//! Every page extends `base.html`, which expects `title`, `nav` and
//! `notices` on the template struct.

use crate::error::PageError;
use askama::Template;
use axum::response::Html;
use bookmarket_core::{Actor, Book, Message, Role, User, UserId};

/// Navigation state for the page header
#[derive(Debug, Clone, Copy, Default)]
pub struct Nav {
    pub signed_in: bool,
    pub is_seller: bool,
    pub user_id: UserId,
}

impl From<&Actor> for Nav {
    fn from(actor: &Actor) -> Self {
        Self {
            signed_in: actor.is_authenticated(),
            is_seller: actor.role() == Some(Role::Seller),
            user_id: actor.id().unwrap_or_default(),
        }
    }
}

/// Book data for templates
#[derive(Debug, Clone, Default)]
pub struct BookView {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub condition: String,
    pub price: String,
    pub image_url: String,
    pub seller_id: UserId,
    /// Whether the viewer listed this book
    pub is_mine: bool,
}

impl BookView {
    pub fn new(book: &Book, viewer: &Actor) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone().unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
            condition: book.condition.clone().unwrap_or_default(),
            price: format!("{:.2}", book.price),
            image_url: book.image_url.clone().unwrap_or_default(),
            seller_id: book.seller_id,
            is_mine: viewer.id() == Some(book.seller_id),
        }
    }
}

/// User data for templates
#[derive(Debug, Clone)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub role: String,
    pub member_since: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            contact: user.contact.clone(),
            role: user.role.to_string(),
            member_since: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Message data for templates
#[derive(Debug, Clone)]
pub struct MessageView {
    pub from_me: bool,
    pub text: String,
    pub sent_at: String,
}

impl MessageView {
    pub fn new(message: &Message, viewer: UserId) -> Self {
        Self {
            from_me: message.sender_id == viewer,
            text: message.message_text.clone(),
            sent_at: message.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Home page template
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
    pub user: UserView,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
}

/// Catalog template; the filter fields echo the submitted query
#[derive(Template)]
#[template(path = "books.html")]
pub struct BooksTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
    pub books: Vec<BookView>,
    /// Whether any filter narrowed the listing
    pub filtered: bool,
    pub filter_title: String,
    pub filter_author: String,
    pub min_price: String,
    pub max_price: String,
}

/// Add and edit listing form
#[derive(Template)]
#[template(path = "book_form.html")]
pub struct BookFormTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub book: BookView,
}

#[derive(Template)]
#[template(path = "messages.html")]
pub struct MessagesTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
    pub other_user: UserView,
    pub conversation: Vec<MessageView>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
    pub user: UserView,
    pub is_seller: bool,
    pub books: Vec<BookView>,
}

#[derive(Template)]
#[template(path = "edit_profile.html")]
pub struct EditProfileTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
    pub user: UserView,
}

/// Error page template
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub nav: Nav,
    pub notices: Vec<String>,
    pub error_code: u16,
    pub error_message: String,
}

impl ErrorTemplate {
    pub fn new(error_code: u16, error_message: &str) -> Self {
        Self {
            title: format!("Error {} - Bookmarket", error_code),
            nav: Nav::default(),
            notices: Vec::new(),
            error_code,
            error_message: error_message.to_string(),
        }
    }
}

/// Page title with the site suffix
pub fn page_title(page: &str) -> String {
    format!("{} - Bookmarket", page)
}

/// Render a template into an HTML response body
pub fn render<T: Template>(template: &T) -> Result<Html<String>, PageError> {
    template
        .render()
        .map(Html)
        .map_err(|e| PageError::Internal(format!("Template rendering failed: {}", e)))
}
