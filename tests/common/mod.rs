#![allow(dead_code)]

use std::sync::Arc;

use agileboard_api::auth::{Argon2PasswordHasher, TokenService};
use agileboard_api::database::MemoryStore;
use agileboard_api::{app, AppState};
use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub tokens: TokenService,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// A registered, logged-in user.
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let tokens = TokenService::new(SECRET, "AgileBoard", "AgileBoard", 1);
        let hasher = Argon2PasswordHasher::with_params(8, 1, 1).expect("valid argon2 params");
        let state = AppState::with_hasher(Arc::new(MemoryStore::new()), tokens.clone(), Arc::new(hasher));
        Self {
            router: app(state, &[]),
            tokens,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await.context("router call")?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers `username` with password `secret1` and logs in.
    pub async fn user(&self, username: &str) -> Result<TestUser> {
        let registered = self
            .send(
                Method::POST,
                "/api/users/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "secret1"
                })),
            )
            .await?;
        anyhow::ensure!(registered.status == StatusCode::CREATED, "register failed: {:?}", registered.body);

        let login = self
            .send(
                Method::POST,
                "/api/users/login",
                None,
                Some(json!({ "username": username, "password": "secret1" })),
            )
            .await?;
        anyhow::ensure!(login.status == StatusCode::OK, "login failed: {:?}", login.body);

        Ok(TestUser {
            id: login.data()["user"]["id"].as_i64().context("user id")?,
            username: username.to_string(),
            token: login.data()["token"].as_str().context("token")?.to_string(),
        })
    }

    /// Creates a project owned by `owner` and returns its id.
    pub async fn project(&self, owner: &TestUser, name: &str) -> Result<i64> {
        let res = self
            .post("/api/project", &owner.token, json!({ "name": name, "description": "" }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create project failed: {:?}", res.body);
        res.data()["id"].as_i64().context("project id")
    }

    pub async fn add_participant(&self, owner: &TestUser, project_id: i64, user: &TestUser) -> Result<()> {
        let res = self
            .post(
                &format!("/api/project/{project_id}/participants"),
                &owner.token,
                json!({ "userId": user.id }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "add participant failed: {:?}", res.body);
        Ok(())
    }

    /// Sprint starting tomorrow and lasting two weeks.
    pub async fn sprint(&self, owner: &TestUser, project_id: i64, name: &str) -> Result<i64> {
        let start = chrono::Utc::now() + chrono::Duration::days(1);
        let end = start + chrono::Duration::days(14);
        let res = self
            .post(
                "/api/sprint",
                &owner.token,
                json!({ "name": name, "projectId": project_id, "startDate": start, "endDate": end }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create sprint failed: {:?}", res.body);
        res.data()["id"].as_i64().context("sprint id")
    }

    pub async fn work_item(&self, owner: &TestUser, project_id: i64, name: &str) -> Result<i64> {
        let res = self
            .post("/api/workitem", &owner.token, json!({ "name": name, "projectId": project_id }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create work item failed: {:?}", res.body);
        res.data()["id"].as_i64().context("work item id")
    }
}
