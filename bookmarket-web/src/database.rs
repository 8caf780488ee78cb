//! SQLite persistence for users, books and messages

use bookmarket_core::{
    async_trait, Book, BookDraft, BookFilter, BookId, CredentialStore, DatabaseConfig, MarketError,
    MarketResult, Message, NewUser, Role, User, UserId, ValidationError,
};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    QueryBuilder, Sqlite, SqlitePool,
};
use std::str::FromStr;
use tracing::{debug, error, info};

use crate::{WebError, WebResult};

const BOOK_COLUMNS: &str =
    "id, title, author, description, condition, price, image_url, seller_id, created_at";

/// Handle to the marketplace database
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and create the tables if they do not exist yet
    pub async fn connect(config: &DatabaseConfig) -> WebResult<Self> {
        info!("Connecting to database: {}", config.url);

        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let pool = if config.is_memory() {
            // Every connection to `:memory:` is a separate database, so keep
            // exactly one and never let the pool close it.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    info!("Creating database directory: {}", parent.display());
                    std::fs::create_dir_all(parent).map_err(|e| {
                        WebError::Database(format!("Failed to create directory: {}", e))
                    })?;
                }
            }

            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await?
        };

        let database = Self { pool };
        database.create_tables().await?;
        info!("Database ready");

        Ok(database)
    }

    async fn create_tables(&self) -> WebResult<()> {
        debug!("Creating users table");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                contact TEXT NOT NULL DEFAULT '',
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("Creating books table");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT,
                description TEXT,
                condition TEXT,
                price REAL NOT NULL,
                image_url TEXT,
                seller_id INTEGER NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("Creating messages table");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id INTEGER NOT NULL REFERENCES users(id),
                receiver_id INTEGER NOT NULL REFERENCES users(id),
                message_text TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Catalog listing in the order books were listed
    pub async fn list_books(&self, filter: &BookFilter) -> MarketResult<Vec<Book>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM books WHERE 1 = 1",
            BOOK_COLUMNS
        ));

        if let Some(title) = &filter.title {
            query
                .push(" AND LOWER(title) LIKE LOWER(")
                .push_bind(like_pattern(title))
                .push(") ESCAPE '\\'");
        }
        if let Some(author) = &filter.author {
            query
                .push(" AND LOWER(author) LIKE LOWER(")
                .push_bind(like_pattern(author))
                .push(") ESCAPE '\\'");
        }
        if let Some(min) = filter.min_price {
            query.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            query.push(" AND price <= ").push_bind(max);
        }
        query.push(" ORDER BY id ASC");

        let records: Vec<BookRecord> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(records.into_iter().map(Book::from).collect())
    }

    pub async fn books_by_seller(&self, seller_id: UserId) -> MarketResult<Vec<Book>> {
        let records: Vec<BookRecord> = sqlx::query_as(&format!(
            "SELECT {} FROM books WHERE seller_id = ? ORDER BY id ASC",
            BOOK_COLUMNS
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(records.into_iter().map(Book::from).collect())
    }

    pub async fn find_book(&self, id: BookId) -> MarketResult<Option<Book>> {
        let record: Option<BookRecord> =
            sqlx::query_as(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        Ok(record.map(Book::from))
    }

    /// Insert a listing owned by `seller_id`
    pub async fn create_book(&self, seller_id: UserId, draft: &BookDraft) -> MarketResult<Book> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO books (title, author, description, condition, price, image_url, seller_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.description)
        .bind(&draft.condition)
        .bind(draft.price)
        .bind(&draft.image_url)
        .bind(seller_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        let book = Book {
            id: result.last_insert_rowid(),
            title: draft.title.clone(),
            author: draft.author.clone(),
            description: draft.description.clone(),
            condition: draft.condition.clone(),
            price: draft.price,
            image_url: draft.image_url.clone(),
            seller_id,
            created_at,
        };
        info!("Seller {} listed book {}", seller_id, book.id);

        Ok(book)
    }

    /// Overwrite every listing field. Ownership never changes.
    pub async fn update_book(&self, id: BookId, draft: &BookDraft) -> MarketResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = ?, author = ?, description = ?, condition = ?, price = ?, image_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.description)
        .bind(&draft.condition)
        .bind(draft.price)
        .bind(&draft.image_url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(MarketError::not_found("Book", id));
        }
        info!("Book {} updated", id);
        Ok(())
    }

    pub async fn delete_book(&self, id: BookId) -> MarketResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(MarketError::not_found("Book", id));
        }
        info!("Book {} deleted", id);
        Ok(())
    }

    pub async fn send_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: &str,
    ) -> MarketResult<Message> {
        let timestamp = Utc::now();
        let result = sqlx::query(
            "INSERT INTO messages (sender_id, receiver_id, message_text, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(text)
        .bind(timestamp)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        debug!("Message from {} to {} stored", sender_id, receiver_id);
        Ok(Message {
            id: result.last_insert_rowid(),
            sender_id,
            receiver_id,
            message_text: text.to_string(),
            timestamp,
        })
    }

    /// Messages exchanged between two users in either direction, oldest first
    pub async fn conversation(&self, a: UserId, b: UserId) -> MarketResult<Vec<Message>> {
        let records: Vec<MessageRecord> = sqlx::query_as(
            r#"
            SELECT id, sender_id, receiver_id, message_text, timestamp
            FROM messages
            WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
            ORDER BY julianday(timestamp) ASC, id ASC
            "#,
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(records.into_iter().map(Message::from).collect())
    }

    /// Cheap liveness check for the health endpoint
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_user_by_id(&self, id: UserId) -> MarketResult<Option<User>> {
        let record: Option<UserRecord> = sqlx::query_as(
            "SELECT id, name, email, contact, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        record.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> MarketResult<Option<User>> {
        let record: Option<UserRecord> = sqlx::query_as(
            "SELECT id, name, email, contact, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        record.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: NewUser) -> MarketResult<User> {
        if self.find_user_by_email(&user.email).await?.is_some() {
            return Err(ValidationError::EmailTaken.into());
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (name, email, contact, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.contact)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Lost a race with a concurrent registration
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return MarketError::from(ValidationError::EmailTaken);
                }
            }
            storage_error(e)
        })?;

        let id = result.last_insert_rowid();
        info!("Registered {} user {}", user.role, id);

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            contact: user.contact,
            password_hash: user.password_hash,
            role: user.role,
            created_at,
        })
    }

    async fn update_profile(&self, id: UserId, name: &str, contact: &str) -> MarketResult<()> {
        let result = sqlx::query("UPDATE users SET name = ?, contact = ? WHERE id = ?")
            .bind(name)
            .bind(contact)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(MarketError::not_found("User", id));
        }
        Ok(())
    }
}

fn storage_error(err: sqlx::Error) -> MarketError {
    error!("Database error: {}", err);
    MarketError::storage(err)
}

/// `%needle%` with LIKE wildcards in the needle escaped.
///
/// Case is left alone; the query folds both sides with the same `LOWER`.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    contact: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = MarketError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role = record
            .role
            .parse::<Role>()
            .map_err(|e| MarketError::Storage(format!("user {}: {}", record.id, e)))?;

        Ok(User {
            id: record.id,
            name: record.name,
            email: record.email,
            contact: record.contact,
            password_hash: record.password_hash,
            role,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookRecord {
    id: i64,
    title: String,
    author: Option<String>,
    description: Option<String>,
    condition: Option<String>,
    price: f64,
    image_url: Option<String>,
    seller_id: i64,
    created_at: DateTime<Utc>,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Book {
            id: record.id,
            title: record.title,
            author: record.author,
            description: record.description,
            condition: record.condition,
            price: record.price,
            image_url: record.image_url,
            seller_id: record.seller_id,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRecord {
    id: i64,
    sender_id: i64,
    receiver_id: i64,
    message_text: String,
    timestamp: DateTime<Utc>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Message {
            id: record.id,
            sender_id: record.sender_id,
            receiver_id: record.receiver_id,
            message_text: record.message_text,
            timestamp: record.timestamp,
        }
    }
}
