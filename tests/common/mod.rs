#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use genba_api::auth::JwtSessionStore;
use genba_api::client::postal::PostalError;
use genba_api::client::{AddressApi, PostalLookup};
use genba_api::config::AppConfig;
use genba_api::database::{MemoryStore, Store};
use genba_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Canned zipcloud replies; only 1000001 resolves.
struct CannedAddressApi;

#[async_trait]
impl AddressApi for CannedAddressApi {
    async fn search(&self, zipcode: &str) -> Result<Value, PostalError> {
        if zipcode == "1000001" {
            return Ok(json!({
                "status": 200,
                "results": [{
                    "zipcode": "1000001",
                    "prefcode": "13",
                    "address1": "東京都",
                    "address2": "千代田区",
                    "address3": "千代田",
                }]
            }));
        }
        Ok(json!({ "status": 200, "results": null }))
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub sessions: JwtSessionStore,
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub cache_control: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_store(store.clone(), store)
    }

    /// Router over `backend`; `store` is the memory store it ultimately writes to.
    pub fn with_store(store: Arc<MemoryStore>, backend: Arc<dyn Store>) -> Self {
        let mut config = AppConfig::development();
        config.security.session_secret = TEST_SECRET.to_string();

        let state = AppState::new(
            backend,
            Arc::new(JwtSessionStore::new(TEST_SECRET, 1)),
            PostalLookup::new(CannedAddressApi),
            config,
        );

        Self {
            store,
            sessions: JwtSessionStore::new(TEST_SECRET, 1),
            router: app(state),
        }
    }

    pub fn token(&self, user_id: &str, role: &str) -> String {
        self.sessions
            .issue(user_id, &format!("User {}", user_id), role)
            .expect("token")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let cache_control = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };

        Ok(TestResponse { status, cache_control, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }
}
