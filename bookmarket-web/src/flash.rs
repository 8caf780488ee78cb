//! One-shot notices carried across a redirect
//!
//! The notice is attached to the redirect response as a cookie and consumed
//! by the next page that renders it.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bookmarket_core::UserMessage;

pub const FLASH_COOKIE: &str = "bookmarket_flash";

fn flash_cookie(message: &UserMessage) -> Cookie<'static> {
    // The jar percent-encodes values on the way out and decodes them on the way in
    Cookie::build((FLASH_COOKIE, message.as_str().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Add a notice to `jar`
pub fn set(jar: CookieJar, message: &UserMessage) -> CookieJar {
    jar.add(flash_cookie(message))
}

/// Read and clear the pending notice
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_string());

    match message {
        Some(message) => (
            jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
            Some(message),
        ),
        None => (jar, None),
    }
}

/// Redirect to `to` with a notice for the next page
pub fn redirect(to: &str, message: impl Into<UserMessage>) -> Response {
    let jar = set(CookieJar::new(), &message.into());
    (jar, Redirect::to(to)).into_response()
}

/// Redirect keeping the caller's jar changes, e.g. a new session cookie
pub fn redirect_with(jar: CookieJar, to: &str, message: impl Into<UserMessage>) -> Response {
    (set(jar, &message.into()), Redirect::to(to)).into_response()
}
