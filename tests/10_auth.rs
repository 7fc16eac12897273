mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let app = TestApp::new();

    let health = app.send(Method::GET, "/health", None, None).await?;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.data()["store"], "memory");

    let root = app.send(Method::GET, "/", None, None).await?;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["success"], true);
    Ok(())
}

#[tokio::test]
async fn login_token_carries_user_id_claim() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice").await?;

    let claims = app.tokens.validate(&alice.token)?;
    assert_eq!(i64::from(claims.user_id()), alice.id);
    assert_eq!(serde_json::to_value(&claims)?["UserId"], alice.id.to_string());

    let me = app.get("/api/users/me", &alice.token).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["username"], "alice");
    assert!(me.data().get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> Result<()> {
    let app = TestApp::new();

    let missing = app.send(Method::GET, "/api/project", None, None).await?;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], true);

    let bogus = app.get("/api/tag", "not-a-token").await?;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);

    let alice = app.user("alice").await?;
    let ok = app.get("/api/users", &alice.token).await?;
    assert_eq!(ok.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_rejected_uniformly() -> Result<()> {
    let app = TestApp::new();
    app.user("alice").await?;

    let wrong = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "username": "alice", "password": "nope" })),
        )
        .await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.message(), "Invalid username or password.");

    let unknown = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "username": "bob", "password": "secret1" })),
        )
        .await?;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.message(), wrong.message());
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let app = TestApp::new();
    app.user("alice").await?;

    let again = app
        .send(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": "alice", "email": "x@example.com", "password": "secret1" })),
        )
        .await?;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let blank = app
        .send(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": "bob", "email": "", "password": "secret1" })),
        )
        .await?;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    Ok(())
}
