//! Book endpoints
//!
//! Reads need any authenticated user; changes need the Administrator role.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppResult, ErrorResponse},
    models::{BookCreateDto, BookDto, BookUpdateDto},
    AppState,
};

use super::{AdminUser, ApiJson, ApiPath, AuthenticatedUser};

/// List all books, covers embedded as base-64
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of books", body = Vec<BookDto>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookDto>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book record", body = BookDto),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<BookDto>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a new book, optionally with its cover
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookCreateDto,
    responses(
        (status = 201, description = "Book created", body = BookDto),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    ApiJson(data): ApiJson<BookCreateDto>,
) -> AppResult<(StatusCode, Json<BookDto>)> {
    let book = state.services.books.create(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book and synchronize its cover
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID, must match the body id")),
    request_body = BookUpdateDto,
    responses(
        (status = 204, description = "Book updated"),
        (status = 400, description = "Invalid input or id mismatch", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<BookUpdateDto>,
) -> AppResult<StatusCode> {
    state.services.books.update(id, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a book and its cover
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
