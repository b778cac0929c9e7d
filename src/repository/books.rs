//! Books repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::collections::HashMap;

use super::BookRepository;
use crate::{
    error::AppResult,
    models::{Author, Book},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Attach each book's author, loaded in one query
    async fn with_authors(&self, mut books: Vec<Book>) -> AppResult<Vec<Book>> {
        let mut author_ids: Vec<i32> = books.iter().filter_map(|b| b.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        if author_ids.is_empty() {
            return Ok(books);
        }

        let authors: HashMap<i32, Author> =
            sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = ANY($1)")
                .bind(&author_ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|a| (a.id, a))
                .collect();

        for book in &mut books {
            book.author = book.author_id.and_then(|id| authors.get(&id).cloned());
        }
        Ok(books)
    }
}

#[async_trait]
impl BookRepository for BooksRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.with_authors(books).await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match book {
            Some(book) => Ok(self.with_authors(vec![book]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, book: &Book) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, year, isbn, summary, image, price, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(&book.summary)
        .bind(&book.image)
        .bind(book.price)
        .bind(book.author_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, book: &Book) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, year = $2, isbn = $3, summary = $4, image = $5, price = $6, author_id = $7
            WHERE id = $8
            "#,
        )
        .bind(&book.title)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(&book.summary)
        .bind(&book.image)
        .bind(book.price)
        .bind(book.author_id)
        .bind(book.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, book: &Book) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn image_file_name(&self, id: i32) -> AppResult<Option<String>> {
        let image: Option<Option<String>> =
            sqlx::query_scalar("SELECT image FROM books WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(image.flatten())
    }
}
