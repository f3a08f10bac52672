//! Common test utilities for integration tests
//!
//! - In-memory application state with a fixed signing secret
//! - Account helpers returning ready-to-use bearer tokens
//! - Request helpers driving the router with `tower::ServiceExt::oneshot`

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use tasktrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktrack_shared::models::user::Role;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";

/// Password that satisfies the strength rule
pub const PASSWORD: &str = "Secret@123";

/// Test context containing the router and the state behind it
pub struct TestContext {
    pub state: AppState,
    pub app: Router,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_env_map(HashMap::from([(
            "TASKTRACK_JWT__SECRET".to_string(),
            TEST_SECRET.to_string(),
        )]))
        .expect("test configuration");

        let state = AppState::in_memory(config);
        let app = build_router(state.clone());

        Self { state, app }
    }

    /// Registers a USER through the API; returns `(token, user id)`
    pub async fn register(&self, username: &str) -> (String, Uuid) {
        let res = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "register {}: {}", username, res.body);

        let token = res.body["token"].as_str().expect("token").to_string();
        let id = res.body["user"]["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("user id");
        (token, id)
    }

    /// Provisions an ADMIN directly through the credential store
    pub async fn admin(&self, username: &str) -> (String, Uuid) {
        let user = self
            .state
            .credentials
            .provision(username, &format!("{}@example.com", username), PASSWORD, Role::Admin)
            .await
            .expect("provision admin");
        let token = self.state.tokens.issue(&user).expect("issue token");
        (token, user.id)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.send(builder.body(body).expect("request")).await;
        decode(response).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }
}

pub async fn decode(response: Response) -> TestResponse {
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };

    TestResponse {
        status,
        location,
        body,
    }
}
