//! Authors service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorCreateDto, AuthorDto, AuthorUpdateDto},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    /// Create a new authors service
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all authors with their books
    #[tracing::instrument(skip_all, fields(tag = "Authors - GetAuthors"))]
    pub async fn list(&self) -> AppResult<Vec<AuthorDto>> {
        tracing::info!("Attempted GetAuthors");
        let authors = self.repository.authors.find_all().await?;
        tracing::info!("Successfully got all authors");
        Ok(authors.into_iter().map(AuthorDto::from).collect())
    }

    /// Get an author by ID
    #[tracing::instrument(skip_all, fields(tag = "Authors - GetAuthor", id = id))]
    pub async fn get_by_id(&self, id: i32) -> AppResult<AuthorDto> {
        tracing::info!("Attempted GetAuthor({})", id);
        let author = self.repository.authors.find_by_id(id).await?.ok_or_else(|| {
            tracing::warn!("No author {}", id);
            AppError::NotFound(format!("Author {} not found", id))
        })?;
        tracing::info!("Successfully got author {}", id);
        Ok(author.into())
    }

    /// Validate and insert a new author
    #[tracing::instrument(skip_all, fields(tag = "Authors - Create"))]
    pub async fn create(&self, data: AuthorCreateDto) -> AppResult<AuthorDto> {
        tracing::info!("Author creation attempted");
        if let Err(errors) = data.validate() {
            tracing::warn!("Invalid author: {}", errors);
            return Err(errors.into());
        }

        let author = Author::from(data);
        let created = self
            .repository
            .authors
            .create(&author)
            .await?
            .ok_or_else(|| AppError::internal(format!("Author {} creation failed", author)))?;

        tracing::info!("Author {} created", created.id);
        Ok(created.into())
    }

    /// Update an author; the path id must match the body id
    #[tracing::instrument(skip_all, fields(tag = "Authors - Update", id = id))]
    pub async fn update(&self, id: i32, data: AuthorUpdateDto) -> AppResult<()> {
        tracing::info!("Author update attempted");
        if id < 1 || id != data.id {
            tracing::warn!("Bad id {} (body id {})", id, data.id);
            return Err(AppError::BadRequest(format!(
                "Path id {} must be positive and match body id {}",
                id, data.id
            )));
        }
        if let Err(errors) = data.validate() {
            tracing::warn!("Invalid author: {}", errors);
            return Err(errors.into());
        }

        let author = Author::from(data);
        if !self.repository.authors.update(&author).await? {
            return Err(AppError::internal(format!("Author {} '{}' update failed", id, author)));
        }

        tracing::info!("Author {} updated", id);
        Ok(())
    }

    /// Delete an existing author
    #[tracing::instrument(skip_all, fields(tag = "Authors - Delete", id = id))]
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        tracing::info!("Author delete attempted");
        if id < 1 {
            tracing::warn!("id < 1 was submitted");
            return Err(AppError::BadRequest("Id must be positive".to_string()));
        }
        if !self.repository.authors.exists(id).await? {
            tracing::warn!("Unknown author {}", id);
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }

        // The row can vanish between the two round-trips
        let author = self.repository.authors.find_by_id(id).await?.ok_or_else(|| {
            tracing::warn!("Author {} disappeared after existence check", id);
            AppError::NotFound(format!("Author {} not found", id))
        })?;

        if !self.repository.authors.delete(&author).await? {
            return Err(AppError::internal(format!("Author {} delete failed", id)));
        }

        tracing::info!("Author {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockAuthorRepository, MockBookRepository};
    use std::sync::{Arc, Mutex};

    fn service(authors: MockAuthorRepository) -> AuthorsService {
        AuthorsService::new(Repository::from_parts(authors, MockBookRepository::new()))
    }

    fn author(id: i32) -> Author {
        Author {
            id,
            firstname: "John".to_string(),
            lastname: "Doe".to_string(),
            bio: "Writes things".to_string(),
            books: Vec::new(),
        }
    }

    fn update_dto(id: i32) -> AuthorUpdateDto {
        AuthorUpdateDto {
            id,
            firstname: "John".to_string(),
            lastname: "Doe".to_string(),
            bio: "Writes things".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_submitted_fields() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|a| Ok(Some(Author { id: 12, ..a.clone() })));
        repo.expect_find_by_id()
            .withf(|id| *id == 12)
            .returning(|id| {
                Ok(Some(Author {
                    id,
                    firstname: "Jane".to_string(),
                    lastname: "Austen".to_string(),
                    bio: "Novelist".to_string(),
                    books: Vec::new(),
                }))
            });
        let service = service(repo);

        let created = service
            .create(AuthorCreateDto {
                firstname: "Jane".to_string(),
                lastname: "Austen".to_string(),
                bio: "Novelist".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 12);

        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_invalid_never_hits_repository() {
        let service = service(MockAuthorRepository::new());
        let result = service
            .create(AuthorCreateDto {
                firstname: String::new(),
                lastname: "Doe".to_string(),
                bio: "x".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_reported_failure_is_internal() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_create().times(1).returning(|_| Ok(None));

        let result = service(repo)
            .create(AuthorCreateDto {
                firstname: "John".to_string(),
                lastname: "Doe".to_string(),
                bio: "x".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reported_failure_is_logged_with_tag() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut repo = MockAuthorRepository::new();
        repo.expect_create().times(1).returning(|_| Ok(None));
        let result = service(repo)
            .create(AuthorCreateDto {
                firstname: "John".to_string(),
                lastname: "Doe".to_string(),
                bio: "x".to_string(),
            })
            .await;
        assert!(result.is_err());

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|l| l.contains("ERROR"))
            .expect("no error logged");
        assert!(line.contains("Authors - Create"), "{}", line);
        assert!(line.contains("John Doe creation failed"), "{}", line);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo).get_by_id(404).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_id_mismatch_never_hits_repository() {
        let service = service(MockAuthorRepository::new());

        let result = service.update(5, update_dto(6)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = service.update(0, update_dto(0)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_reported_failure_is_internal() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_update()
            .withf(|a| a.id == 3 && a.lastname == "Doe")
            .times(1)
            .returning(|_| Ok(false));

        let result = service(repo).update(3, update_dto(3)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_update_success() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_update().times(1).returning(|_| Ok(true));

        assert!(service(repo).update(3, update_dto(3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_never_deletes() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(false));
        repo.expect_delete().never();

        let result = service(repo).delete(999).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_rejects_non_positive_id() {
        let result = service(MockAuthorRepository::new()).delete(0).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_exists().returning(|_| Ok(true));
        repo.expect_find_by_id().returning(|id| Ok(Some(author(id))));
        repo.expect_delete()
            .withf(|a| a.id == 8)
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(repo).delete(8).await.is_ok());
    }

    #[tokio::test]
    async fn test_database_error_propagates() {
        let mut repo = MockAuthorRepository::new();
        repo.expect_find_all()
            .returning(|| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        assert!(matches!(service(repo).list().await, Err(AppError::Database(_))));
    }
}
