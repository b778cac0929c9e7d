//! Repository layer for database operations
//!
//! Controllers only see the [`AuthorRepository`] and [`BookRepository`]
//! traits; the Postgres implementations live in the submodules.

pub mod authors;
pub mod books;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Author, Book},
};

/// Persistence operations for authors.
///
/// `update` and `delete` report `false` when no row was affected, and
/// `create` reports `None` when the insert produced no row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// All authors with their books
    async fn find_all(&self) -> AppResult<Vec<Author>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Author>>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    async fn create(&self, author: &Author) -> AppResult<Option<Author>>;
    async fn update(&self, author: &Author) -> AppResult<bool>;
    async fn delete(&self, author: &Author) -> AppResult<bool>;
}

/// Persistence operations for books, same conventions as [`AuthorRepository`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books with their author
    async fn find_all(&self) -> AppResult<Vec<Book>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    async fn create(&self, book: &Book) -> AppResult<Option<Book>>;
    async fn update(&self, book: &Book) -> AppResult<bool>;
    async fn delete(&self, book: &Book) -> AppResult<bool>;
    /// Cover file name currently stored for a book
    async fn image_file_name(&self, id: i32) -> AppResult<Option<String>>;
}

/// Main repository struct holding the per-entity repositories
#[derive(Clone)]
pub struct Repository {
    pool: Option<Pool<Postgres>>,
    pub authors: Arc<dyn AuthorRepository>,
    pub books: Arc<dyn BookRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Build from arbitrary implementations, without a backing pool
    pub fn from_parts(
        authors: impl AuthorRepository + 'static,
        books: impl BookRepository + 'static,
    ) -> Self {
        Self {
            pool: None,
            authors: Arc::new(authors),
            books: Arc::new(books),
        }
    }

    /// Round-trip to the database; always succeeds without a pool
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
