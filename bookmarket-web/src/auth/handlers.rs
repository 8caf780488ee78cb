//! Authentication handlers for registration, login and logout

use super::{CurrentActor, SessionManager};
use crate::error::PageError;
use crate::flash;
use crate::handlers::take_notices;
use crate::templates::{page_title, render, LoginTemplate, Nav, RegisterTemplate};
use crate::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use bookmarket_core::{
    hash_password, verify_password, CredentialStore, Gate, LoginForm, MarketError, NewUser,
    RegistrationForm, UserMessage, ValidationError,
};
use tracing::{info, warn};

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";

pub async fn register_form(
    CurrentActor(actor): CurrentActor,
    jar: CookieJar,
) -> Result<Response, PageError> {
    if actor.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let (jar, notices) = take_notices(jar);
    let page = render(&RegisterTemplate {
        title: page_title("Register"),
        nav: Nav::from(&actor),
        notices,
    })?;
    Ok((jar, page).into_response())
}

/// User registration endpoint
///
/// Validates the form, stores the user with a hashed password and sends
/// them on to the login page.
pub async fn register(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, PageError> {
    if actor.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let registration = form.validate().map_err(|e| {
        info!("Registration rejected: {}", e);
        PageError::invalid(REGISTER_PATH, e)
    })?;

    let user = state
        .database
        .create_user(NewUser {
            name: registration.name,
            email: registration.email,
            contact: registration.contact,
            password_hash: hash_password(&registration.password)?,
            role: registration.role,
        })
        .await
        .map_err(|e| match e {
            MarketError::Validation(err) => PageError::invalid(REGISTER_PATH, err),
            other => other.into(),
        })?;

    info!("User registered successfully: {}", user.id);
    Ok(flash::redirect(
        LOGIN_PATH,
        UserMessage::new("Registration successful! Please log in."),
    ))
}

pub async fn login_form(
    CurrentActor(actor): CurrentActor,
    jar: CookieJar,
) -> Result<Response, PageError> {
    if actor.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let (jar, notices) = take_notices(jar);
    let page = render(&LoginTemplate {
        title: page_title("Log in"),
        nav: Nav::from(&actor),
        notices,
    })?;
    Ok((jar, page).into_response())
}

/// User login endpoint
///
/// On success the session cookie is set and the user lands on the home page.
/// Unknown email and wrong password get the same notice.
pub async fn login(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    if actor.is_authenticated() {
        return Ok(Redirect::to("/").into_response());
    }

    let email = form.email.trim();
    let user = state.database.find_user_by_email(email).await?;

    let Some(user) = user.filter(|u| verify_password(u, &form.password)) else {
        warn!("Failed login attempt for {}", email);
        return Err(PageError::invalid(LOGIN_PATH, ValidationError::InvalidCredentials));
    };

    let token = state.sessions.issue(user.id)?;
    info!("User logged in successfully: {}", user.id);

    let jar = jar.add(state.sessions.cookie(token));
    Ok((jar, Redirect::to("/")).into_response())
}

/// End the session and return to the login page
pub async fn logout(
    CurrentActor(actor): CurrentActor,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let me = Gate::new(&actor).require_authenticated().finish()?;
    info!("User logout: {}", me.id);

    let jar = jar.remove(SessionManager::removal_cookie());
    Ok(flash::redirect_with(jar, LOGIN_PATH, UserMessage::new("Logged out.")))
}
