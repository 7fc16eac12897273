//! Fixtures for unit tests: an in-memory store and seeding helpers that
//! bypass the services.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::auth::Argon2PasswordHasher;
use crate::database::models::{Project, Sprint, Tag, User, WorkItem, WorkItemState};
use crate::database::repository::{
    NewProject, NewSprint, NewUser, NewWorkItem, ProjectRepository, SprintRepository,
    TagRepository, UserRepository, WorkItemRepository,
};
use crate::database::MemoryStore;

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Argon2id with the minimum cost so tests stay fast.
pub fn fast_hasher() -> Arc<Argon2PasswordHasher> {
    Arc::new(Argon2PasswordHasher::with_params(8, 1, 1).expect("valid argon2 params"))
}

pub async fn seed_user(store: &MemoryStore, username: &str) -> User {
    store
        .insert_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: String::new(),
            salt: String::new(),
        })
        .await
        .expect("insert user")
}

pub async fn seed_project(store: &MemoryStore, name: &str, owner_id: i32) -> Project {
    store
        .insert_project(NewProject {
            name: name.to_string(),
            description: format!("{name} description"),
            owner_id,
            created_at: Utc::now(),
        })
        .await
        .expect("insert project")
}

/// Sprint running from `start_in_days` to `start_in_days + length_days`.
pub async fn seed_sprint(
    store: &MemoryStore,
    name: &str,
    project_id: i32,
    start_in_days: i64,
    length_days: i64,
) -> Sprint {
    let start = days_from_now(start_in_days);
    store
        .insert_sprint(NewSprint {
            name: name.to_string(),
            description: String::new(),
            start_date: start,
            end_date: start + Duration::days(length_days),
            project_id,
        })
        .await
        .expect("insert sprint")
}

pub async fn seed_work_item(
    store: &MemoryStore,
    name: &str,
    project_id: i32,
    sprint_id: Option<i32>,
) -> WorkItem {
    store
        .insert_work_item(NewWorkItem {
            name: name.to_string(),
            description: String::new(),
            state: WorkItemState::ToDo,
            index: 0,
            project_id,
            sprint_id,
        })
        .await
        .expect("insert work item")
}

pub async fn seed_tag(store: &MemoryStore, name: &str) -> Tag {
    store.insert_tag(name).await.expect("insert tag")
}

pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}
