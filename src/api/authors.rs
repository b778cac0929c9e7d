//! Author endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{AppResult, ErrorResponse},
    models::{AuthorCreateDto, AuthorDto, AuthorUpdateDto},
    AppState,
};

use super::{ApiJson, ApiPath};

/// List all authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "List of authors", body = Vec<AuthorDto>),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<AuthorDto>>> {
    let authors = state.services.authors.list().await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author record", body = AuthorDto),
        (status = 404, description = "Author not found"),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<AuthorDto>> {
    let author = state.services.authors.get_by_id(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = AuthorCreateDto,
    responses(
        (status = 201, description = "Author created", body = AuthorDto),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<AuthorCreateDto>,
) -> AppResult<(StatusCode, Json<AuthorDto>)> {
    let author = state.services.authors.create(data).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Replace an author's fields
#[utoipa::path(
    patch,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID, must match the body id")),
    request_body = AuthorUpdateDto,
    responses(
        (status = 204, description = "Author updated"),
        (status = 400, description = "Invalid input or id mismatch", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<AuthorUpdateDto>,
) -> AppResult<StatusCode> {
    state.services.authors.update(id, data).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Author not found"),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
