//! Persistence for books.

use async_trait::async_trait;
use bookshelf_db::DbPool;
use time::OffsetDateTime;

use super::models::{Book, BookChanges, NewBook};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

/// Book persistence. The store owns id assignment and timestamps.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every book, oldest id first
    async fn all(&self) -> Result<Vec<Book>, StoreError>;
    async fn find(&self, id: i64) -> Result<Book, StoreError>;
    /// Persist a new book, assigning its id and both timestamps
    async fn create(&self, book: NewBook) -> Result<Book, StoreError>;
    /// Overwrite the given fields and refresh `updated_at`
    async fn update(&self, id: i64, changes: BookChanges) -> Result<Book, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

pub struct SqliteBookStore {
    pool: DbPool,
}

impl SqliteBookStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn all(&self) -> Result<Vec<Book>, StoreError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, description, author, created_at, updated_at FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn find(&self, id: i64) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, description, author, created_at, updated_at FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        let now = OffsetDateTime::now_utc();

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, description, author, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, description, author, created_at, updated_at
            "#,
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(&book.author)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(book_id = created.id, "book created");
        Ok(created)
    }

    async fn update(&self, id: i64, changes: BookChanges) -> Result<Book, StoreError> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                author = COALESCE(?, author),
                updated_at = MAX(?, updated_at)
            WHERE id = ?
            RETURNING id, title, description, author, created_at, updated_at
            "#,
        )
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.author)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        tracing::debug!(book_id = id, "book updated");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(book_id = id, "book deleted");
        Ok(())
    }
}
