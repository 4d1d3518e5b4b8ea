/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An application router wired to fresh in-memory stores
/// - A token service sharing the router's signing secret, so tests can
///   mint and inspect tokens
/// - Request helpers for driving the router through tower's `Service`

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::Service as _;

use taskvault_api::app::{build_router, AppState};
use taskvault_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskvault_shared::auth::jwt::TokenService;
use taskvault_shared::store::memory::{MemoryCredentialStore, MemoryTaskStore};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the router and a matching token service
pub struct TestContext {
    pub app: Router,
    pub tokens: TokenService,
}

impl TestContext {
    /// Creates a new test context with empty in-memory stores
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://unused-in-tests".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: TEST_SECRET.to_string(),
            },
        };

        let state = AppState::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryTaskStore::new()),
            config,
        );

        Self {
            app: build_router(state),
            tokens: TokenService::new(TEST_SECRET),
        }
    }

    /// Sends a request and returns the status plus the parsed JSON body
    /// (`Value::Null` for empty bodies)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json_body) => builder
                .header("content-type", "application/json")
                .body(Body::from(json_body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, parsed)
    }

    /// Registers a user; returns status and body
    pub async fn register(&self, email: &str, password: &str, role: Value) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/register",
            None,
            Some(json!({
                "email": email,
                "password": password,
                "role": role,
            })),
        )
        .await
    }

    /// Logs in; returns status and body
    pub async fn login(&self, email: &str, password: &str, role: Value) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/login",
            None,
            Some(json!({
                "email": email,
                "password": password,
                "role": role,
            })),
        )
        .await
    }

    /// Registers and logs a user in, returning their token
    pub async fn signup(&self, email: &str, password: &str, role: Value) -> String {
        let (status, _) = self.register(email, password, role.clone()).await;
        assert_eq!(status, StatusCode::CREATED, "registration should succeed");

        let (status, body) = self.login(email, password, role).await;
        assert_eq!(status, StatusCode::OK, "login should succeed");

        body["token"].as_str().expect("token in response").to_string()
    }

    /// Creates a task with the standard test fields, returning its id
    pub async fn create_task(&self, token: &str) -> String {
        let (status, body) = self
            .request("POST", "/task", Some(token), Some(test_task_fields()))
            .await;
        assert_eq!(status, StatusCode::CREATED, "task creation should succeed");

        body["task_id"]
            .as_str()
            .expect("task_id in response")
            .to_string()
    }
}

/// The standard task payload used across tests
pub fn test_task_fields() -> Value {
    json!({
        "title": "t",
        "description": "d",
        "priority": "high",
        "status": "open",
        "due_date": "2025-01-01",
    })
}
