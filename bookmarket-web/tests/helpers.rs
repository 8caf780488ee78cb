//! Integration test helpers
//!
//! Each test spawns the real server on a random port against a fresh
//! in-memory database and talks to it over HTTP.

#![allow(dead_code)]

use bookmarket_core::{AppConfig, Book, CredentialStore, Role, UserId};
use bookmarket_web::{AppState, BookmarketServer};
use reqwest::{header, redirect, Response, StatusCode};
use std::sync::LazyLock;
use tokio::net::TcpListener;

pub const PASSWORD: &str = "password123";

// Make sure tracing is only initialized once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// A running test server
pub struct TestApp {
    pub address: String,
    pub state: AppState,
}

/// One browser: its own cookie jar, never follows redirects
pub struct Browser {
    address: String,
    client: reqwest::Client,
}

/// A registered, signed-in user and their browser
pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub browser: Browser,
}

pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = BookmarketServer::new(AppConfig::for_testing())
        .await
        .expect("Failed to build server");
    let state = server.state().clone();

    tokio::spawn(async move {
        server.serve(listener).await.expect("Server failed");
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        state,
    }
}

impl TestApp {
    pub fn browser(&self) -> Browser {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .cookie_store(true)
            .build()
            .expect("Failed to build client");

        Browser {
            address: self.address.clone(),
            client,
        }
    }

    /// Register through the form and return the response
    pub async fn register(&self, browser: &Browser, name: &str, email: &str, role: &str) -> Response {
        browser
            .post(
                "/register",
                &[
                    ("name", name),
                    ("email", email),
                    ("contact", "555-0100"),
                    ("password", PASSWORD),
                    ("password_confirm", PASSWORD),
                    ("role", role),
                ],
            )
            .await
    }

    /// Register and sign in a new user
    pub async fn signed_in(&self, email: &str, role: Role) -> TestUser {
        let browser = self.browser();

        let response = self.register(&browser, "Test User", email, role.as_str()).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = browser
            .post("/login", &[("email", email), ("password", PASSWORD)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let user = self
            .state
            .database
            .find_user_by_email(email)
            .await
            .unwrap()
            .expect("registered user missing");

        TestUser {
            id: user.id,
            email: email.to_string(),
            browser,
        }
    }

    /// List a book as `seller` and return the stored record
    pub async fn list_book(&self, seller: &TestUser, title: &str, price: &str) -> Book {
        let response = seller
            .browser
            .post("/books/add", &[("title", title), ("price", price)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        self.state
            .database
            .books_by_seller(seller.id)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.title == title)
            .expect("listed book missing")
    }

    pub async fn book(&self, id: i64) -> Option<Book> {
        self.state.database.find_book(id).await.unwrap()
    }
}

impl Browser {
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Follow a redirect by hand and return the page body
    pub async fn follow(&self, response: Response) -> String {
        let target = location(&response);
        self.get(&target).await.text().await.unwrap()
    }
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}
