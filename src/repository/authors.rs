//! Authors repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::collections::HashMap;

use super::AuthorRepository;
use crate::{
    error::AppResult,
    models::{Author, Book},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Books of the given authors, grouped by author id
    async fn books_by_author(&self, author_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Book>>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE author_id = ANY($1) ORDER BY id",
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<Book>> = HashMap::new();
        for book in books {
            if let Some(author_id) = book.author_id {
                grouped.entry(author_id).or_default().push(book);
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl AuthorRepository for AuthorsRepository {
    async fn find_all(&self) -> AppResult<Vec<Author>> {
        let mut authors = sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let mut books = self.books_by_author(&ids).await?;
        for author in &mut authors {
            author.books = books.remove(&author.id).unwrap_or_default();
        }
        Ok(authors)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match author {
            Some(mut author) => {
                author.books = self.books_by_author(&[id]).await?.remove(&id).unwrap_or_default();
                Ok(Some(author))
            }
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, author: &Author) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (firstname, lastname, bio)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&author.firstname)
        .bind(&author.lastname)
        .bind(&author.bio)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, author: &Author) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE authors SET firstname = $1, lastname = $2, bio = $3 WHERE id = $4",
        )
        .bind(&author.firstname)
        .bind(&author.lastname)
        .bind(&author.bio)
        .bind(author.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, author: &Author) -> AppResult<bool> {
        // Fails with a foreign-key violation while books still reference the author
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(author.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
