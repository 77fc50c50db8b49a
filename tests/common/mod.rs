//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the full router against an in-memory database via
//! `tower::ServiceExt::oneshot`. The AI client is constructed without an API
//! key, so AI endpoints answer 503 unless a test overrides the base URL.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use wayfarer::config::{Config, GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use wayfarer::db::{create_in_memory_pool, migrations};
use wayfarer::handlers;
use wayfarer::services::ai_client::GeminiClient;
use wayfarer::state::AppState;

pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// Fresh in-memory database with migrations applied; no AI key.
    pub fn new() -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        let config = Config {
            host: "127.0.0.1".into(),
            port: 5000,
            database_path: PathBuf::from(":memory:"),
            migrations_path: PathBuf::from("migrations"),
            gemini: GeminiConfig {
                api_key: None,
                base_url: DEFAULT_GEMINI_BASE_URL.into(),
                model: DEFAULT_GEMINI_MODEL.into(),
            },
        };

        let ai = GeminiClient::new(config.gemini.clone()).expect("Failed to create AI client");

        let state = AppState {
            db: pool,
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ai,
        };

        Self { state }
    }

    pub fn router(&self) -> Router {
        handlers::routes().with_state(self.state.clone())
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(value) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.request("GET", uri, None, None).await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> (StatusCode, String) {
        self.request("GET", uri, None, Some(token)).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, String) {
        self.request("POST", uri, Some(body), None).await
    }

    pub async fn patch_json(&self, uri: &str, body: &Value) -> (StatusCode, String) {
        self.request("PATCH", uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, String) {
        self.request("DELETE", uri, None, None).await
    }

    /// GET and parse the response body as JSON.
    pub async fn get_value(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body).unwrap_or(Value::Null);
        (status, parsed)
    }

    // =========================================================================
    // Helpers for creating entities through the API
    // =========================================================================

    /// Create a place and return its id.
    pub async fn create_place(&self, name: &str, category: &str) -> i64 {
        let (status, body) = self
            .post_json(
                "/api/places",
                &json!({
                    "name": name,
                    "location": "Somewhere",
                    "description": "A test place",
                    "category": category,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create_place failed: {}", body);
        extract_id(&body)
    }

    /// Create a trip and return its id. `budget` is in currency units.
    pub async fn create_trip(
        &self,
        name: &str,
        destination: &str,
        start_date: &str,
        end_date: &str,
        budget: Option<f64>,
    ) -> i64 {
        let mut trip = json!({
            "name": name,
            "destination": destination,
            "startDate": start_date,
            "endDate": end_date,
        });
        if let Some(amount) = budget {
            trip["budget"] = json!({ "amount": amount, "currency": "USD" });
        }

        let (status, body) = self.post_json("/api/trips", &trip).await;
        assert_eq!(status, StatusCode::CREATED, "create_trip failed: {}", body);
        extract_id(&body)
    }

    /// Create an expense and return its id. `amount` is in currency units.
    pub async fn create_expense(
        &self,
        title: &str,
        amount: f64,
        category: &str,
        date: &str,
        trip_id: Option<i64>,
    ) -> i64 {
        let mut expense = json!({
            "title": title,
            "amount": amount,
            "category": category,
            "date": date,
        });
        if let Some(id) = trip_id {
            expense["tripId"] = json!(id);
        }

        let (status, body) = self.post_json("/api/expenses", &expense).await;
        assert_eq!(
            status,
            StatusCode::CREATED,
            "create_expense failed: {}",
            body
        );
        extract_id(&body)
    }

    /// Register a user and return the bearer token.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/auth/register",
                &json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let value: Value = serde_json::from_str(&body).unwrap();
        value["token"].as_str().unwrap().to_string()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull `data.id` out of a success envelope.
pub fn extract_id(body: &str) -> i64 {
    let value: Value = serde_json::from_str(body).expect("response is not JSON");
    value["data"]["id"].as_i64().expect("no data.id in response")
}
