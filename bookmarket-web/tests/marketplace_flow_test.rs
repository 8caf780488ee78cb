//! End-to-end marketplace flows: accounts, catalog, messages and profile

mod helpers;

use bookmarket_core::{CredentialStore, Role};
use helpers::{location, spawn_app, PASSWORD};
use reqwest::StatusCode;

#[tokio::test]
async fn weak_password_creates_no_user() {
    let app = spawn_app().await;
    let browser = app.browser();

    let response = browser
        .post(
            "/register",
            &[
                ("name", "Weak"),
                ("email", "weak@example.com"),
                ("password", "abcdefg"),
                ("password_confirm", "abcdefg"),
                ("role", "buyer"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");

    let page = browser.follow(response).await;
    assert!(page.contains("Password must be at least 8 characters long and contain a number."));
    assert!(app
        .state
        .database
        .find_user_by_email("weak@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn registration_validation_notices() {
    let app = spawn_app().await;
    let browser = app.browser();

    let cases: [(&[(&str, &str)], &str); 4] = [
        (
            &[("name", "A"), ("email", "a@example.com")],
            "Please fill out all required fields.",
        ),
        (
            &[
                ("name", "A"),
                ("email", "a@example.com"),
                ("password", "password123"),
                ("password_confirm", "password124"),
            ],
            "Passwords do not match.",
        ),
        (
            &[
                ("name", "A"),
                ("email", "not-an-email"),
                ("password", "password123"),
                ("password_confirm", "password123"),
            ],
            "Invalid email address.",
        ),
        (
            &[
                ("name", "A"),
                ("email", "a@example.com"),
                ("password", "password123"),
                ("password_confirm", "password123"),
                ("role", "admin"),
            ],
            "Please choose either buyer or seller.",
        ),
    ];

    for (form, notice) in cases {
        let response = browser.post("/register", form).await;
        assert_eq!(location(&response), "/register");
        let page = browser.follow(response).await;
        assert!(page.contains(notice), "expected notice: {}", notice);
    }
}

#[tokio::test]
async fn register_login_logout() {
    let app = spawn_app().await;
    let browser = app.browser();

    let registered = app
        .register(&browser, "Alice", "alice@example.com", "buyer")
        .await;
    assert_eq!(location(&registered), "/login");
    let page = browser.follow(registered).await;
    assert!(page.contains("Registration successful! Please log in."));

    // The notice is shown once
    let again = browser.get("/login").await.text().await.unwrap();
    assert!(!again.contains("Registration successful!"));

    let login = browser
        .post(
            "/login",
            &[("email", "alice@example.com"), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(location(&login), "/");

    let home = browser.get("/").await;
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.text().await.unwrap().contains("Welcome, Alice"));

    // Signed-in users are sent home from the account forms
    assert_eq!(location(&browser.get("/login").await), "/");
    assert_eq!(location(&browser.get("/register").await), "/");

    let logout = browser.get("/logout").await;
    assert_eq!(location(&logout), "/login");
    let page = browser.follow(logout).await;
    assert!(page.contains("Logged out."));

    assert_eq!(browser.get("/").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = spawn_app().await;
    let browser = app.browser();

    app.register(&browser, "First", "dup@example.com", "buyer")
        .await;
    let second = app
        .register(&browser, "Second", "dup@example.com", "seller")
        .await;
    assert_eq!(location(&second), "/register");
    let page = browser.follow(second).await;
    assert!(page.contains("Email already registered."));

    let user = app
        .state
        .database
        .find_user_by_email("dup@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "First");
}

#[tokio::test]
async fn invalid_login_shows_generic_notice() {
    let app = spawn_app().await;
    let browser = app.browser();
    app.register(&browser, "Bob", "bob@example.com", "buyer").await;

    for (email, password) in [
        ("bob@example.com", "wrong-password1"),
        ("nobody@example.com", PASSWORD),
    ] {
        let response = browser
            .post("/login", &[("email", email), ("password", password)])
            .await;
        assert_eq!(location(&response), "/login");
        let page = browser.follow(response).await;
        assert!(page.contains("Invalid credentials"));
    }

    assert_eq!(browser.get("/").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn seller_lists_books_and_catalog_filters() {
    let app = spawn_app().await;
    let seller = app.signed_in("seller@example.com", Role::Seller).await;

    let missing = seller
        .browser
        .post("/books/add", &[("title", "No price")])
        .await;
    assert_eq!(location(&missing), "/books/add");
    assert!(seller
        .browser
        .follow(missing)
        .await
        .contains("Please provide both title and price."));

    let added = seller
        .browser
        .post(
            "/books/add",
            &[
                ("title", "The Rust Programming Language"),
                ("author", "Klabnik"),
                ("price", "30"),
            ],
        )
        .await;
    assert_eq!(location(&added), "/books");
    assert!(seller
        .browser
        .follow(added)
        .await
        .contains("Book added successfully!"));

    app.list_book(&seller, "Dune", "9.50").await;
    app.list_book(&seller, "Neuromancer", "15").await;

    let visitor = app.browser();
    let all = visitor.get("/books").await.text().await.unwrap();
    assert!(all.contains("Dune") && all.contains("Neuromancer"));

    let by_title = visitor.get("/books?title=rust").await.text().await.unwrap();
    assert!(by_title.contains("The Rust Programming Language"));
    assert!(!by_title.contains("Neuromancer"));

    let by_author = visitor.get("/books?author=KLAB").await.text().await.unwrap();
    assert!(by_author.contains("The Rust Programming Language"));
    assert!(!by_author.contains("Dune"));

    let by_price = visitor
        .get("/books?min_price=9.5&max_price=15")
        .await
        .text()
        .await
        .unwrap();
    assert!(by_price.contains("Dune") && by_price.contains("Neuromancer"));
    assert!(!by_price.contains("The Rust Programming Language"));
}

#[tokio::test]
async fn catalog_search_with_accented_title() {
    let app = spawn_app().await;
    let visitor = app.browser();

    let empty = visitor.get("/books").await.text().await.unwrap();
    assert!(empty.contains("No books are listed yet."));

    let seller = app.signed_in("seller@example.com", Role::Seller).await;
    app.list_book(&seller, "Émile", "12").await;

    let found = visitor
        .get("/books?title=%C3%89mile")
        .await
        .text()
        .await
        .unwrap();
    assert!(found.contains("Émile"));
    assert!(!found.contains("No books match your search."));

    let missing = visitor.get("/books?title=zzz").await.text().await.unwrap();
    assert!(missing.contains("No books match your search."));
}

#[tokio::test]
async fn bad_price_filter_is_shown_inline() {
    let app = spawn_app().await;
    let seller = app.signed_in("seller@example.com", Role::Seller).await;
    app.list_book(&seller, "Cheap", "5").await;
    app.list_book(&seller, "Pricey", "50").await;

    let visitor = app.browser();

    let bad_min = visitor.get("/books?min_price=abc&max_price=10").await;
    assert_eq!(bad_min.status(), StatusCode::OK);
    let page = bad_min.text().await.unwrap();
    assert!(page.contains("Price filters must be valid numbers."));
    // Both bounds are dropped
    assert!(page.contains("Cheap") && page.contains("Pricey"));

    let bad_max = visitor
        .get("/books?min_price=10&max_price=abc")
        .await
        .text()
        .await
        .unwrap();
    assert!(bad_max.contains("Price filters must be valid numbers."));
    // The valid lower bound still applies
    assert!(bad_max.contains("Pricey"));
    assert!(!bad_max.contains("Cheap"));
}

#[tokio::test]
async fn messages_between_users() {
    let app = spawn_app().await;
    let buyer = app.signed_in("buyer@example.com", Role::Buyer).await;
    let seller = app.signed_in("seller@example.com", Role::Seller).await;

    let to_seller = format!("/messages/{}", seller.id);
    let to_buyer = format!("/messages/{}", buyer.id);

    let sent = buyer
        .browser
        .post(&to_seller, &[("message", "Is Dune still available?")])
        .await;
    assert_eq!(location(&sent), to_seller);
    assert!(buyer.browser.follow(sent).await.contains("Message sent."));

    seller
        .browser
        .post(&to_buyer, &[("message", "Yes, it is.")])
        .await;

    // Blank messages are not stored
    let blank = buyer.browser.post(&to_seller, &[("message", "   ")]).await;
    assert_eq!(location(&blank), to_seller);

    let page = buyer.browser.get(&to_seller).await.text().await.unwrap();
    let question = page.find("Is Dune still available?").unwrap();
    let answer = page.find("Yes, it is.").unwrap();
    assert!(question < answer);

    let stored = app
        .state
        .database
        .conversation(buyer.id, seller.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);

    assert_eq!(
        buyer.browser.get("/messages/9999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.browser().get(&to_seller).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn profile_view_and_edit() {
    let app = spawn_app().await;
    let seller = app.signed_in("seller@example.com", Role::Seller).await;
    app.list_book(&seller, "Dune", "9.50").await;

    let profile = seller.browser.get("/profile").await.text().await.unwrap();
    assert!(profile.contains("seller@example.com"));
    assert!(profile.contains("Your listings"));
    assert!(profile.contains("Dune"));

    let empty = seller
        .browser
        .post("/profile/edit", &[("name", "  "), ("contact", "x")])
        .await;
    assert_eq!(location(&empty), "/profile/edit");
    assert!(seller
        .browser
        .follow(empty)
        .await
        .contains("Name cannot be empty."));

    let saved = seller
        .browser
        .post(
            "/profile/edit",
            &[("name", "  Sally Seller "), ("contact", " 555-0199 ")],
        )
        .await;
    assert_eq!(location(&saved), "/profile");
    assert!(seller
        .browser
        .follow(saved)
        .await
        .contains("Profile updated successfully."));

    let user = app
        .state
        .database
        .find_user_by_id(seller.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "Sally Seller");
    assert_eq!(user.contact, "555-0199");

    let buyer = app.signed_in("buyer@example.com", Role::Buyer).await;
    let buyer_profile = buyer.browser.get("/profile").await.text().await.unwrap();
    assert!(!buyer_profile.contains("Your listings"));
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = spawn_app().await;
    let browser = app.browser();

    let health = browser.get("/health").await;
    assert_eq!(health.status(), StatusCode::OK);
    let body: serde_json::Value = health.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    assert_eq!(
        browser.get("/definitely/not/here").await.status(),
        StatusCode::NOT_FOUND
    );
}
