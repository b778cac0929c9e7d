//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use super::book::{Book, BookDto};

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub bio: String,
    /// Books written by this author, loaded separately from the row
    #[sqlx(skip)]
    pub books: Vec<Book>,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.firstname, self.lastname)
    }
}

/// Author as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub bio: String,
    #[serde(default)]
    pub books: Vec<BookDto>,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCreateDto {
    #[serde(default, alias = "Firstname")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub firstname: String,
    #[serde(default, alias = "Lastname")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub lastname: String,
    /// Biography, at most 250 characters
    #[serde(default, alias = "Bio")]
    #[validate(length(min = 1, max = 250, message = "Biography is required and limited to 250 characters"))]
    pub bio: String,
}

/// Update author request; the body id must match the path id
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorUpdateDto {
    #[serde(default, alias = "Id")]
    pub id: i32,
    #[serde(default, alias = "Firstname")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub firstname: String,
    #[serde(default, alias = "Lastname")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub lastname: String,
    #[serde(default, alias = "Bio")]
    #[validate(length(min = 1, max = 250, message = "Biography is required and limited to 250 characters"))]
    pub bio: String,
}

impl From<AuthorCreateDto> for Author {
    fn from(dto: AuthorCreateDto) -> Self {
        Self {
            id: 0,
            firstname: dto.firstname,
            lastname: dto.lastname,
            bio: dto.bio,
            books: Vec::new(),
        }
    }
}

impl From<AuthorUpdateDto> for Author {
    fn from(dto: AuthorUpdateDto) -> Self {
        Self {
            id: dto.id,
            firstname: dto.firstname,
            lastname: dto.lastname,
            bio: dto.bio,
            books: Vec::new(),
        }
    }
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            firstname: author.firstname,
            lastname: author.lastname,
            bio: author.bio,
            books: author.books.into_iter().map(BookDto::from).collect(),
        }
    }
}
