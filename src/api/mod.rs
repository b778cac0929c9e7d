//! API handlers for the Bookstore REST endpoints

pub mod authors;
pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::get,
    Router,
};

use crate::{
    error::AppError,
    models::{UserClaims, ADMINISTRATOR_ROLE},
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Authenticated user holding the Administrator role.
///
/// List it before any body extractor so the role is checked before the
/// body is read.
pub struct AdminUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require_role(ADMINISTRATOR_ROLE)?;
        Ok(AdminUser(claims))
    }
}

/// JSON body extractor whose rejections become 400 responses
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections become 400 responses
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Routes mounted under `/api`
pub fn routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authors
        .route(
            "/authors",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/authors/:id",
            get(authors::get_author)
                .patch(authors::update_author)
                .delete(authors::delete_author),
        )
        .merge(book_routes())
        .with_state(state)
}

/// Book routes carry base-64 covers, so no body size limit applies to them
fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .layer(DefaultBodyLimit::disable())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, Response},
        Router,
    };
    use chrono::Duration;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::{
        config::AppConfig,
        models::{UserClaims, ADMINISTRATOR_ROLE},
        repository::{MockAuthorRepository, MockBookRepository, Repository},
        services::{images::ImageStore, Services},
        AppState,
    };

    pub fn app(authors: MockAuthorRepository, books: MockBookRepository, images: ImageStore) -> Router {
        let config = AppConfig::default();
        let services = Services::new(Repository::from_parts(authors, books), images);
        Router::new().nest(
            "/api",
            super::routes(AppState {
                config: Arc::new(config),
                services: Arc::new(services),
            }),
        )
    }

    pub fn token(roles: &[&str]) -> String {
        let roles = roles.iter().map(|r| r.to_string()).collect();
        UserClaims::new("tester@bookstore.com", roles, Duration::hours(1))
            .create_token(&AppConfig::default().auth.jwt_secret)
            .unwrap()
    }

    pub fn admin_token() -> String {
        token(&[ADMINISTRATOR_ROLE])
    }

    pub async fn send(
        app: Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap()
    }

    pub async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
