//! Book model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::author::{Author, AuthorDto};

/// Full book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub summary: Option<String>,
    /// Cover file name, relative to the uploads directory
    pub image: Option<String>,
    pub price: Option<Decimal>,
    pub author_id: Option<i32>,
    #[sqlx(skip)]
    pub author: Option<Author>,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.isbn)
    }
}

/// Book as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    /// Base-64 encoded cover image, filled from the uploads directory
    pub file: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub author_id: Option<i32>,
    pub author: Option<AuthorDto>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_image"))]
pub struct BookCreateDto {
    #[serde(default, alias = "Title")]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default, alias = "Year")]
    pub year: Option<i32>,
    #[serde(default, alias = "Isbn")]
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[serde(default, alias = "Summary")]
    #[validate(length(max = 500, message = "Summary is limited to 500 characters"))]
    pub summary: Option<String>,
    #[serde(default, alias = "Image")]
    #[validate(custom(function = "validate_file_name"))]
    pub image: Option<String>,
    /// Base-64 encoded cover image written under `image`
    #[serde(default, alias = "File")]
    pub file: Option<String>,
    #[serde(default, alias = "Price", with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default, alias = "AuthorId")]
    #[validate(required(message = "Author is required"))]
    pub author_id: Option<i32>,
}

/// Update book request; the body id must match the path id
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_image"))]
pub struct BookUpdateDto {
    #[serde(default, alias = "Id")]
    pub id: i32,
    #[serde(default, alias = "Title")]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default, alias = "Year")]
    pub year: Option<i32>,
    #[serde(default, alias = "Isbn")]
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[serde(default, alias = "Summary")]
    #[validate(length(max = 500, message = "Summary is limited to 500 characters"))]
    pub summary: Option<String>,
    #[serde(default, alias = "Image")]
    #[validate(custom(function = "validate_file_name"))]
    pub image: Option<String>,
    #[serde(default, alias = "File")]
    pub file: Option<String>,
    #[serde(default, alias = "Price", with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default, alias = "AuthorId")]
    pub author_id: Option<i32>,
}

/// Cover names are joined onto the uploads directory, so they must stay a
/// single plain path component. Empty means "no image".
fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    let plain = name.is_empty()
        || (name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']));
    if plain {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_file_name")
            .with_message("Image must be a plain file name".into()))
    }
}

/// Prices are stored as NUMERIC(10, 2)
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.round_dp(2).abs() < Decimal::new(100_000_000, 0) {
        Ok(())
    } else {
        Err(ValidationError::new("price_out_of_range")
            .with_message("Price must be below 100000000".into()))
    }
}

fn validate_image_reference(image: &Option<String>, file: &Option<String>) -> Result<(), ValidationError> {
    let has_file = file.as_deref().is_some_and(|f| !f.is_empty());
    let has_image = image.as_deref().is_some_and(|i| !i.is_empty());
    if has_file && !has_image {
        return Err(ValidationError::new("missing_image_name")
            .with_message("Image file name is required when file content is sent".into()));
    }
    Ok(())
}

fn validate_create_image(dto: &BookCreateDto) -> Result<(), ValidationError> {
    validate_image_reference(&dto.image, &dto.file)
}

fn validate_update_image(dto: &BookUpdateDto) -> Result<(), ValidationError> {
    validate_image_reference(&dto.image, &dto.file)
}

impl From<BookCreateDto> for Book {
    fn from(dto: BookCreateDto) -> Self {
        Self {
            id: 0,
            title: dto.title,
            year: dto.year,
            isbn: dto.isbn,
            summary: dto.summary,
            image: dto.image,
            price: dto.price,
            author_id: dto.author_id,
            author: None,
        }
    }
}

impl From<BookUpdateDto> for Book {
    fn from(dto: BookUpdateDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            year: dto.year,
            isbn: dto.isbn,
            summary: dto.summary,
            image: dto.image,
            price: dto.price,
            author_id: dto.author_id,
            author: None,
        }
    }
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            year: book.year,
            isbn: book.isbn,
            summary: book.summary,
            image: book.image,
            file: None,
            price: book.price,
            author_id: book.author_id,
            author: book.author.map(AuthorDto::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn create_dto() -> BookCreateDto {
        BookCreateDto {
            title: "A Wizard of Earthsea".to_string(),
            year: Some(1968),
            isbn: "978-0-553-38304-2".to_string(),
            summary: None,
            image: Some("earthsea.png".to_string()),
            file: None,
            price: Some(Decimal::from_str("9.99").unwrap()),
            author_id: Some(1),
        }
    }

    #[test]
    fn test_valid_create() {
        assert!(create_dto().validate().is_ok());
    }

    #[test]
    fn test_create_requires_author() {
        let dto = BookCreateDto { author_id: None, ..create_dto() };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("author_id"));
    }

    #[test]
    fn test_image_must_be_plain_file_name() {
        for name in ["../etc/passwd", "covers/a.png", "..", "a\\b.png"] {
            let dto = BookCreateDto { image: Some(name.to_string()), ..create_dto() };
            assert!(dto.validate().is_err(), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_file_without_image_name() {
        let dto = BookCreateDto {
            image: None,
            file: Some("aGVsbG8=".to_string()),
            ..create_dto()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_summary_length() {
        let dto = BookCreateDto { summary: Some("s".repeat(501)), ..create_dto() };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("summary"));
    }

    #[test]
    fn test_price_fits_column() {
        let dto = BookCreateDto {
            price: Some(Decimal::from_str("99999999.99").unwrap()),
            ..create_dto()
        };
        assert!(dto.validate().is_ok());

        let dto = BookCreateDto {
            price: Some(Decimal::from_str("100000000").unwrap()),
            ..create_dto()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn test_price_as_json_number() {
        let dto: BookCreateDto = serde_json::from_str(
            r#"{"title":"T","isbn":"1","authorId":2,"price":12.5}"#,
        )
        .unwrap();
        assert_eq!(dto.price, Some(Decimal::from_str("12.5").unwrap()));
        assert_eq!(dto.author_id, Some(2));

        let book = Book::from(dto);
        let json = serde_json::to_value(BookDto::from(book)).unwrap();
        assert_eq!(json["price"], 12.5);
        assert_eq!(json["authorId"], 2);
    }
}
