mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn create_defaults_and_validation() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let project = app.project(&owner, "Apollo").await?;

    let created = app
        .post("/api/workitem", &owner.token, json!({ "name": "Launch", "projectId": project }))
        .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.data()["id"].as_i64().unwrap();
    assert_eq!(created.headers[header::LOCATION], format!("/api/workitem/{id}").as_str());
    assert_eq!(created.data()["state"], "ToDo");
    assert_eq!(created.data()["index"], 0);
    assert!(created.data()["sprintId"].is_null());

    let doing = app
        .post("/api/workitem", &owner.token, json!({ "name": "Fuel", "projectId": project, "state": 1 }))
        .await?;
    assert_eq!(doing.data()["state"], "Doing");

    let blank = app
        .post("/api/workitem", &owner.token, json!({ "name": "  ", "projectId": project }))
        .await?;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.message(), "Work item name is required.");

    let by_state = app.get("/api/workitem/state/doing", &owner.token).await?;
    assert_eq!(by_state.data().as_array().map(Vec::len), Some(1));
    let bad_state = app.get("/api/workitem/state/blocked", &owner.token).await?;
    assert_eq!(bad_state.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn empty_or_negative_updates_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let project = app.project(&owner, "Apollo").await?;
    let item = app.work_item(&owner, project, "Launch").await?;
    let uri = format!("/api/workitem/{item}");

    let empty = app
        .put(
            &uri,
            &owner.token,
            json!({ "name": null, "description": null, "state": null, "index": null, "sprintId": null }),
        )
        .await?;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    let unchanged = app.get(&uri, &owner.token).await?;
    assert_eq!(unchanged.data()["name"], "Launch");

    let negative = app
        .put(&format!("{uri}/index"), &owner.token, json!({ "newIndex": -1 }))
        .await?;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert_eq!(negative.message(), "Index must be zero or greater.");

    let moved = app
        .put(&format!("{uri}/index"), &owner.token, json!({ "newIndex": 3 }))
        .await?;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(app.get(&uri, &owner.token).await?.data()["index"], 3);

    let updated = app
        .put(&uri, &owner.token, json!({ "state": "Done", "name": "Launched" }))
        .await?;
    assert_eq!(updated.data()["state"], "Done");
    assert_eq!(updated.data()["name"], "Launched");
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
    let item = app.work_item(&owner, project, "Launch").await?;
    let uri = format!("/api/workitem/{item}");

    let hidden = app.get(&uri, &outsider.token).await?;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);
    assert_eq!(hidden.message(), "You do not have permission to access this work item.");

    let listed = app.get(&format!("/api/workitem/project/{project}"), &member.token).await?;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(1));

    let edited = app.put(&uri, &member.token, json!({ "name": "Hijacked" })).await?;
    assert_eq!(edited.status, StatusCode::FORBIDDEN);
    assert_eq!(edited.message(), "Only project members can modify work items.");
    assert_eq!(app.get(&uri, &member.token).await?.data()["name"], "Launch");

    let create = app
        .post("/api/workitem", &member.token, json!({ "name": "Extra", "projectId": project }))
        .await?;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
    assert_eq!(create.message(), "Only project members can modify work items.");

    let delete = app.delete(&uri, &member.token).await?;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let assign = app
        .post(&format!("{uri}/assign"), &member.token, json!({ "userId": member.id }))
        .await?;
    assert_eq!(assign.status, StatusCode::FORBIDDEN);

    let missing = app.delete("/api/workitem/9999", &owner.token).await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn assignment_and_tags() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let member = app.user("member").await?;
    let project = app.project(&owner, "Apollo").await?;
    let item = app.work_item(&owner, project, "Launch").await?;
    let uri = format!("/api/workitem/{item}");

    let assigned = app
        .post(&format!("{uri}/assign"), &owner.token, json!({ "userId": member.id }))
        .await?;
    assert_eq!(assigned.status, StatusCode::OK);
    assert_eq!(assigned.data()["message"], "User assigned successfully.");

    let twice = app
        .post(&format!("{uri}/assign"), &owner.token, json!({ "userId": member.id }))
        .await?;
    assert_eq!(twice.status, StatusCode::BAD_REQUEST);

    let mine = app.get(&format!("/api/workitem/assigned/{}", member.id), &member.token).await?;
    assert_eq!(mine.data()[0]["id"], item);

    let unassigned = app
        .delete(&format!("{uri}/unassign/{}", member.id), &owner.token)
        .await?;
    assert_eq!(unassigned.status, StatusCode::OK);

    let tag = app.post("/api/tag", &owner.token, json!({ "name": "urgent" })).await?;
    let tag_id = tag.data()["id"].as_i64().unwrap();

    let tagged = app
        .post(&format!("{uri}/tags"), &owner.token, json!({ "tagId": tag_id }))
        .await?;
    assert_eq!(tagged.status, StatusCode::OK);
    assert_eq!(app.get(&uri, &owner.token).await?.data()["tagIds"][0], tag_id);

    let untagged = app.delete(&format!("{uri}/tags/{tag_id}"), &owner.token).await?;
    assert_eq!(untagged.status, StatusCode::OK);
    let again = app.delete(&format!("{uri}/tags/{tag_id}"), &owner.token).await?;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.message(), "Failed to remove tag from work item.");

    let deleted = app.delete(&uri, &owner.token).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn sprint_membership() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user("owner").await?;
    let project = app.project(&owner, "Apollo").await?;
    let sprint = app.sprint(&owner, project, "S1").await?;
    let item = app.work_item(&owner, project, "Launch").await?;

    app.put(&format!("/api/workitem/{item}/sprint"), &owner.token, json!({ "sprintId": sprint }))
        .await?;
    let in_sprint = app.get(&format!("/api/workitem/sprint/{sprint}"), &owner.token).await?;
    assert_eq!(in_sprint.data()[0]["id"], item);

    app.put(&format!("/api/workitem/{item}/sprint"), &owner.token, json!({ "sprintId": null }))
        .await?;
    let emptied = app.get(&format!("/api/workitem/sprint/{sprint}"), &owner.token).await?;
    assert_eq!(emptied.status, StatusCode::OK);
    assert_eq!(emptied.data().as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn items_only_join_sprints_of_their_own_project() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice").await?;
    let bob = app.user("bob").await?;
    let apollo = app.project(&alice, "Apollo").await?;
    let gemini = app.project(&bob, "Gemini").await?;
    let foreign = app.sprint(&bob, gemini, "G1").await?;
    let item = app.work_item(&alice, apollo, "Launch").await?;
    let uri = format!("/api/workitem/{item}/sprint");

    let cross = app.put(&uri, &alice.token, json!({ "sprintId": foreign })).await?;
    assert_eq!(cross.status, StatusCode::BAD_REQUEST);
    assert_eq!(cross.message(), "The sprint does not belong to the work item's project.");

    let missing = app.put(&uri, &alice.token, json!({ "sprintId": 99999 })).await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let patched = app
        .put(&format!("/api/workitem/{item}"), &alice.token, json!({ "sprintId": foreign }))
        .await?;
    assert_eq!(patched.status, StatusCode::BAD_REQUEST);

    let created = app
        .post(
            "/api/workitem",
            &alice.token,
            json!({ "name": "Fuel", "projectId": apollo, "sprintId": foreign }),
        )
        .await?;
    assert_eq!(created.status, StatusCode::BAD_REQUEST);

    let deleted = app.delete(&format!("/api/sprint/{foreign}"), &bob.token).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    Ok(())
}
