//! Catalog and listing management

use super::{take_notices, PageResult};
use crate::auth::CurrentActor;
use crate::error::{PageError, CATALOG_PATH};
use crate::flash;
use crate::templates::{page_title, render, BookFormTemplate, BookView, BooksTemplate, Nav};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use bookmarket_core::{
    Actor, Book, BookForm, BookId, CatalogQuery, Gate, ListingAction, ListingMode, MarketError,
    Role, UserMessage,
};
use tracing::{info, warn};

/// Book ids arrive as path text; anything that is not an integer names no book
fn parse_book_id(raw: &str) -> Result<BookId, PageError> {
    raw.parse::<BookId>().map_err(|_| PageError::NotFound)
}

async fn load_book(state: &AppState, id: BookId) -> Result<Book, PageError> {
    state
        .database
        .find_book(id)
        .await?
        .ok_or_else(|| MarketError::not_found("Book", id).into())
}

/// Public catalog with optional title, author and price filters
pub async fn catalog(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<CatalogQuery>,
    jar: CookieJar,
) -> PageResult {
    let (filter, filter_error) = query.to_filter();
    let books = state.database.list_books(&filter).await?;

    let (jar, mut notices) = take_notices(jar);
    if let Some(err) = filter_error {
        notices.push(err.to_string());
    }

    let page = render(&BooksTemplate {
        title: page_title("Books"),
        nav: Nav::from(&actor),
        notices,
        books: books.iter().map(|b| BookView::new(b, &actor)).collect(),
        filtered: !filter.is_empty(),
        filter_title: query.title,
        filter_author: query.author,
        min_price: query.min_price,
        max_price: query.max_price,
    })?;
    Ok((jar, page))
}

fn book_form_page(
    actor: &Actor,
    notices: Vec<String>,
    heading: &str,
    action: String,
    submit_label: &str,
    book: BookView,
) -> Result<axum::response::Html<String>, PageError> {
    render(&BookFormTemplate {
        title: page_title(heading),
        nav: Nav::from(actor),
        notices,
        heading: heading.to_string(),
        action,
        submit_label: submit_label.to_string(),
        book,
    })
}

pub async fn add_form(CurrentActor(actor): CurrentActor, jar: CookieJar) -> PageResult {
    Gate::new(&actor).require_role(Role::Seller).finish()?;

    let (jar, notices) = take_notices(jar);
    let page = book_form_page(
        &actor,
        notices,
        "Sell a book",
        "/books/add".to_string(),
        "List book",
        BookView::default(),
    )?;
    Ok((jar, page))
}

/// Create a listing owned by the signed-in seller
pub async fn add(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Form(form): Form<BookForm>,
) -> Result<Response, PageError> {
    let seller = Gate::new(&actor).require_role(Role::Seller).finish()?;

    let draft = form
        .validate(ListingMode::Create)
        .map_err(|e| PageError::invalid("/books/add", e))?;

    state.database.create_book(seller.id, &draft).await?;
    Ok(flash::redirect(
        CATALOG_PATH,
        UserMessage::new("Book added successfully!"),
    ))
}

pub async fn edit_form(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    jar: CookieJar,
) -> PageResult {
    let id = parse_book_id(&id)?;
    let gate = Gate::new(&actor).require_role(Role::Seller);
    gate.decision().into_result()?;

    let book = load_book(&state, id).await?;
    gate.check_ownership(&book)
        .finish()
        .map_err(|d| PageError::denied(d, ListingAction::Edit))?;

    let (jar, notices) = take_notices(jar);
    let page = book_form_page(
        &actor,
        notices,
        "Edit book",
        format!("/books/edit/{}", book.id),
        "Save changes",
        BookView::new(&book, &actor),
    )?;
    Ok((jar, page))
}

/// Update a listing. Only its seller may change it.
pub async fn edit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> Result<Response, PageError> {
    let id = parse_book_id(&id)?;
    let gate = Gate::new(&actor).require_role(Role::Seller);
    gate.decision().into_result()?;

    let book = load_book(&state, id).await?;
    let seller = gate
        .check_ownership(&book)
        .finish()
        .map_err(|d| {
            warn!("Actor {:?} denied edit of book {}: {}", actor.id(), id, d);
            PageError::denied(d, ListingAction::Edit)
        })?;

    let draft = form
        .validate(ListingMode::Edit)
        .map_err(|e| PageError::invalid(format!("/books/edit/{}", id), e))?;

    state.database.update_book(id, &draft).await?;
    info!("Seller {} updated book {}", seller.id, id);
    Ok(flash::redirect(
        CATALOG_PATH,
        UserMessage::new("Book updated successfully."),
    ))
}

/// Delete a listing. Only its seller may remove it.
pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Response, PageError> {
    let id = parse_book_id(&id)?;
    let gate = Gate::new(&actor).require_role(Role::Seller);
    gate.decision().into_result()?;

    let book = load_book(&state, id).await?;
    let seller = gate
        .check_ownership(&book)
        .finish()
        .map_err(|d| {
            warn!("Actor {:?} denied delete of book {}: {}", actor.id(), id, d);
            PageError::denied(d, ListingAction::Delete)
        })?;

    state.database.delete_book(id).await?;
    info!("Seller {} deleted book {}", seller.id, id);
    Ok(flash::redirect(
        CATALOG_PATH,
        UserMessage::new("Book deleted successfully."),
    ))
}
