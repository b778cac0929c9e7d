//! API integration tests against a running server

use bookstore_api::models::{UserClaims, ADMINISTRATOR_ROLE};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Sign a token with the server's secret
fn admin_token() -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    UserClaims::new("integration@bookstore.com", vec![ADMINISTRATOR_ROLE.to_string()], chrono::Duration::hours(1))
        .create_token(&secret)
        .expect("Failed to sign token")
}

async fn create_author(client: &Client, lastname: &str) -> i64 {
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .json(&json!({
            "firstname": "Integration",
            "lastname": lastname,
            "bio": "Created by the integration suite"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_author_lifecycle() {
    let client = Client::new();
    let id = create_author(&client, "Lifecycle").await;

    let response = client
        .patch(format!("{}/authors/{}", BASE_URL, id))
        .json(&json!({
            "Id": id,
            "Firstname": "Integration",
            "Lastname": "Renamed",
            "Bio": "Updated"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/authors/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lastname"], "Renamed");

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/authors/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_create_author_missing_firstname() {
    let client = Client::new();

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .json(&json!({"Firstname": "", "Lastname": "Doe", "Bio": "x"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_books_require_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_book_with_cover() {
    let client = Client::new();
    let token = admin_token();
    let author_id = create_author(&client, "Cover").await;

    // "cover bytes"
    let file = "Y292ZXIgYnl0ZXM=";
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Integration Book",
            "isbn": "978-0-00-000000-0",
            "price": 12.5,
            "authorId": author_id,
            "image": format!("integration-{}.png", author_id),
            "file": file
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.expect("Failed to parse response");
    let book_id = created["id"].as_i64().expect("No id in response");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["file"], file);
    assert_eq!(body["author"]["id"], author_id);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
