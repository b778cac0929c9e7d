//! Books service: catalog CRUD plus cover image synchronization

use validator::Validate;

use super::images::ImageStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookCreateDto, BookDto, BookUpdateDto},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    images: ImageStore,
}

/// Empty names count as "no image"
fn image_name(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

/// Decoded cover bytes when the request carried file content
fn decode_file(file: &Option<String>) -> AppResult<Option<Vec<u8>>> {
    match file.as_deref().filter(|f| !f.is_empty()) {
        Some(content) => ImageStore::decode(content).map(Some),
        None => Ok(None),
    }
}

impl BooksService {
    /// Create a new books service storing covers in `images`
    pub fn new(repository: Repository, images: ImageStore) -> Self {
        Self { repository, images }
    }

    /// Fill `file` from the uploads directory; a missing file is skipped
    async fn attach_file(&self, dto: &mut BookDto) -> AppResult<()> {
        if let Some(name) = image_name(&dto.image) {
            dto.file = self.images.read_base64(name).await?;
        }
        Ok(())
    }

    /// List all books with their author and cover
    #[tracing::instrument(skip_all, fields(tag = "Books - GetBooks"))]
    pub async fn list(&self) -> AppResult<Vec<BookDto>> {
        tracing::info!("Attempted GetBooks");
        let books = self.repository.books.find_all().await?;

        let mut dtos = Vec::with_capacity(books.len());
        for book in books {
            let mut dto = BookDto::from(book);
            self.attach_file(&mut dto).await?;
            dtos.push(dto);
        }

        tracing::info!("Successfully got all books");
        Ok(dtos)
    }

    /// Get a book by ID, cover included
    #[tracing::instrument(skip_all, fields(tag = "Books - GetBook", id = id))]
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookDto> {
        tracing::info!("Attempted GetBook({})", id);
        let book = self.repository.books.find_by_id(id).await?.ok_or_else(|| {
            tracing::warn!("No book {}", id);
            AppError::NotFound(format!("Book {} not found", id))
        })?;

        let mut dto = BookDto::from(book);
        self.attach_file(&mut dto).await?;
        tracing::info!("Successfully got book {}", id);
        Ok(dto)
    }

    /// Validate and insert a new book, then store its cover
    #[tracing::instrument(skip_all, fields(tag = "Books - Create"))]
    pub async fn create(&self, data: BookCreateDto) -> AppResult<BookDto> {
        tracing::info!("Book creation attempted");
        if let Err(errors) = data.validate() {
            tracing::warn!("Invalid book: {}", errors);
            return Err(errors.into());
        }
        let bytes = decode_file(&data.file)?;

        let book = Book::from(data);
        let created = self
            .repository
            .books
            .create(&book)
            .await?
            .ok_or_else(|| AppError::internal(format!("Book {} creation failed", book)))?;

        // Not atomic with the insert: a failure here leaves a row without its file
        if let (Some(bytes), Some(name)) = (bytes, image_name(&created.image)) {
            self.images.write(name, &bytes).await?;
            tracing::info!("Stored cover {}", name);
        }

        tracing::info!("Book {} created", created.id);
        Ok(created.into())
    }

    /// Update a book and replace its cover when the name changes
    #[tracing::instrument(skip_all, fields(tag = "Books - Update", id = id))]
    pub async fn update(&self, id: i32, data: BookUpdateDto) -> AppResult<()> {
        tracing::info!("Book update attempted for id {}", id);
        if id < 1 || id != data.id {
            tracing::warn!("Update failed (bad id {}, body id {})", id, data.id);
            return Err(AppError::BadRequest(format!(
                "Path id {} must be positive and match body id {}",
                id, data.id
            )));
        }
        if !self.repository.books.exists(id).await? {
            tracing::warn!("Failed to retrieve book with id {}", id);
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        if let Err(errors) = data.validate() {
            tracing::warn!("Invalid book: {}", errors);
            return Err(errors.into());
        }
        let bytes = decode_file(&data.file)?;

        let old_image = self.repository.books.image_file_name(id).await?;
        let book = Book::from(data);
        if !self.repository.books.update(&book).await? {
            return Err(AppError::internal(format!("Book {} '{}' update failed", id, book)));
        }

        let new_image = image_name(&book.image);
        if let Some(old) = image_name(&old_image) {
            if new_image != Some(old) && self.images.remove(old).await? {
                tracing::info!("Removed replaced cover {}", old);
            }
        }
        if let (Some(bytes), Some(name)) = (bytes, new_image) {
            self.images.write(name, &bytes).await?;
            tracing::info!("Stored cover {}", name);
        }

        tracing::info!("Book with id {} updated", id);
        Ok(())
    }

    /// Delete a book and its cover
    #[tracing::instrument(skip_all, fields(tag = "Books - Delete", id = id))]
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        tracing::info!("Book delete attempted");
        if id < 1 {
            tracing::warn!("id < 1 was submitted");
            return Err(AppError::BadRequest("Id must be positive".to_string()));
        }
        if !self.repository.books.exists(id).await? {
            tracing::warn!("Unknown book {}", id);
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }

        let book = self.repository.books.find_by_id(id).await?.ok_or_else(|| {
            tracing::error!("Book {} disappeared after existence check", id);
            AppError::NotFound(format!("Book {} not found", id))
        })?;

        if !self.repository.books.delete(&book).await? {
            return Err(AppError::internal(format!("Book {} delete failed", id)));
        }

        // Best effort once the row is gone
        if let Some(name) = image_name(&book.image) {
            if let Err(e) = self.images.remove(name).await {
                tracing::warn!("Could not remove cover {} of book {}: {}", name, id, e);
            }
        }

        tracing::info!("Book {} deleted", id);
        Ok(())
    }
}
