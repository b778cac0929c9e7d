//! Data models for the Bookstore API
//!
//! Entities map to database rows; `*Dto` types are the request/response
//! shapes. Conversions between the two are `From` impls next to each type.

pub mod author;
pub mod book;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorCreateDto, AuthorDto, AuthorUpdateDto};
pub use book::{Book, BookCreateDto, BookDto, BookUpdateDto};
pub use user::{UserClaims, ADMINISTRATOR_ROLE};
