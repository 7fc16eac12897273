mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_validates_dates_and_names() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let project = app.project(&owner, "Apollo").await?;
    let start = Utc::now() + Duration::days(1);

    let reversed = app
        .post(
            "/api/sprint",
            &owner.token,
            json!({ "name": "S1", "projectId": project, "startDate": start, "endDate": start - Duration::hours(1) }),
        )
        .await?;
    assert_eq!(reversed.status, StatusCode::BAD_REQUEST);

    let past = app
        .post(
            "/api/sprint",
            &owner.token,
            json!({ "name": "S1", "projectId": project, "startDate": Utc::now() - Duration::days(3), "endDate": start }),
        )
        .await?;
    assert_eq!(past.status, StatusCode::BAD_REQUEST);
    assert_eq!(past.message(), "Sprint cannot start in the past.");

    let id = app.sprint(&owner, project, "S1").await?;
    let fetched = app.get(&format!("/api/sprint/{id}"), &owner.token).await?;
    assert_eq!(fetched.data()["name"], "S1");
    assert_eq!(fetched.data()["durationInDays"], 14);
    assert_eq!(fetched.data()["isActive"], false);

    let dup = app
        .post(
            "/api/sprint",
            &owner.token,
            json!({ "name": "S1", "projectId": project, "startDate": start, "endDate": start + Duration::days(7) }),
        )
        .await?;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let missing_project = app
        .post(
            "/api/sprint",
            &owner.token,
            json!({ "name": "S9", "projectId": 9999, "startDate": start, "endDate": start + Duration::days(7) }),
        )
        .await?;
    assert_eq!(missing_project.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn participant_reads_but_cannot_write() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let member = app.user("member").await?;
    let outsider = app.user("outsider").await?;
    let project = app.project(&owner, "Apollo").await?;
    app.add_participant(&owner, project, &member).await?;
    let sprint = app.sprint(&owner, project, "S1").await?;
    let uri = format!("/api/sprint/{sprint}");

    let hidden = app.get(&uri, &outsider.token).await?;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);
    assert_eq!(hidden.message(), "You do not have permission to access this sprint.");
    assert_eq!(
        app.get(&format!("/api/sprint/project/{project}"), &outsider.token).await?.status,
        StatusCode::FORBIDDEN
    );

    assert_eq!(app.get(&uri, &member.token).await?.status, StatusCode::OK);
    let listed = app.get(&format!("/api/sprint/project/{project}"), &member.token).await?;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(1));

    let edited = app.put(&uri, &member.token, json!({ "name": "Renamed" })).await?;
    assert_eq!(edited.status, StatusCode::FORBIDDEN);
    assert_eq!(edited.message(), "Only project members can modify sprints.");
    assert_eq!(app.get(&uri, &member.token).await?.data()["name"], "S1");

    let owner_edit = app.put(&uri, &owner.token, json!({ "description": "polish" })).await?;
    assert_eq!(owner_edit.status, StatusCode::OK);
    assert_eq!(owner_edit.data()["description"], "polish");

    let outsider_edit = app.put(&uri, &outsider.token, json!({ "description": "x" })).await?;
    assert_eq!(outsider_edit.status, StatusCode::FORBIDDEN);
    assert_eq!(outsider_edit.message(), "Only project members can modify sprints.");

    let start = Utc::now() + Duration::days(20);
    let create = app
        .post(
            "/api/sprint",
            &member.token,
            json!({ "name": "S2", "projectId": project, "startDate": start, "endDate": start + Duration::days(7) }),
        )
        .await?;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let delete = app.delete(&uri, &member.token).await?;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
    assert_eq!(delete.message(), "Only project members can modify sprints.");
    Ok(())
}

#[tokio::test]
async fn update_keeps_start_before_end() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let project = app.project(&owner, "Apollo").await?;
    let sprint = app.sprint(&owner, project, "S1").await?;
    let uri = format!("/api/sprint/{sprint}");

    let inverted = app
        .put(&uri, &owner.token, json!({ "endDate": Utc::now() - Duration::days(1) }))
        .await?;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);

    let empty = app.put(&uri, &owner.token, json!({})).await?;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let missing = app.put("/api/sprint/9999", &owner.token, json!({ "name": "x" })).await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_is_blocked_by_work_items() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let project = app.project(&owner, "Apollo").await?;
    let sprint = app.sprint(&owner, project, "S1").await?;
    let item = app.work_item(&owner, project, "Launch").await?;

    let moved = app
        .put(&format!("/api/workitem/{item}/sprint"), &owner.token, json!({ "sprintId": sprint }))
        .await?;
    assert_eq!(moved.status, StatusCode::OK);

    let blocked = app.delete(&format!("/api/sprint/{sprint}"), &owner.token).await?;
    assert_eq!(blocked.status, StatusCode::BAD_REQUEST);

    app.put(&format!("/api/workitem/{item}/sprint"), &owner.token, json!({ "sprintId": null }))
        .await?;
    let deleted = app.delete(&format!("/api/sprint/{sprint}"), &owner.token).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn unscoped_listings() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let project = app.project(&owner, "Apollo").await?;

    assert_eq!(app.get("/api/sprint", &owner.token).await?.status, StatusCode::NOT_FOUND);
    app.sprint(&owner, project, "S1").await?;
    assert_eq!(app.get("/api/sprint", &owner.token).await?.status, StatusCode::OK);

    let active = app.get("/api/sprint/active", &owner.token).await?;
    assert_eq!(active.status, StatusCode::OK);
    assert_eq!(active.data().as_array().map(Vec::len), Some(0));

    let from = (Utc::now() + Duration::days(2)).format("%Y-%m-%dT%H:%M:%SZ");
    let to = (Utc::now() + Duration::days(5)).format("%Y-%m-%dT%H:%M:%SZ");
    let range = app
        .get(&format!("/api/sprint/date-range?startDate={from}&endDate={to}"), &owner.token)
        .await?;
    assert_eq!(range.status, StatusCode::OK);
    assert_eq!(range.data().as_array().map(Vec::len), Some(1));

    let backwards = app
        .get(&format!("/api/sprint/date-range?startDate={to}&endDate={from}"), &owner.token)
        .await?;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);
    Ok(())
}
