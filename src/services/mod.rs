//! Business logic services

pub mod authors;
pub mod books;
pub mod images;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and cover store
    pub fn new(repository: Repository, images: images::ImageStore) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            books: books::BooksService::new(repository.clone(), images),
            repository,
        }
    }
}
