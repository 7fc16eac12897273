//! Persistence contract consumed by the services.
//!
//! Every method is async and may fail with a [`StoreError`] on transport or
//! constraint faults. Missing rows are `Ok(None)` / `Ok(false)`, never errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::models::{Project, Sprint, Tag, User, WorkItem, WorkItemState};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("invalid stored value: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::UniqueViolation(db_err.message().to_string());
            }
        }
        StoreError::Sqlx(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
}

/// Blank or absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSprint {
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub project_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct SprintPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewWorkItem {
    pub name: String,
    pub description: String,
    pub state: WorkItemState,
    pub index: i32,
    pub project_id: i32,
    pub sprint_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<WorkItemState>,
    pub index: Option<i32>,
    pub sprint_id: Option<i32>,
}

/// The trimmed value, when present and not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.username).is_none() && non_blank(&self.email).is_none()
    }
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.name).is_none() && non_blank(&self.description).is_none()
    }
}

impl SprintPatch {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.name).is_none()
            && non_blank(&self.description).is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

impl WorkItemPatch {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.name).is_none()
            && non_blank(&self.description).is_none()
            && self.state.is_none()
            && self.index.is_none()
            && self.sprint_id.is_none()
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn user_by_id(&self, id: i32) -> StoreResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn all_users(&self) -> StoreResult<Vec<User>>;
    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>>;
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>>;
    async fn update_password(&self, id: i32, password_hash: &str, salt: &str) -> StoreResult<bool>;
    async fn delete_user(&self, id: i32) -> StoreResult<bool>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn project_by_id(&self, id: i32) -> StoreResult<Option<Project>>;
    async fn project_by_name(&self, name: &str) -> StoreResult<Option<Project>>;
    async fn all_projects(&self) -> StoreResult<Vec<Project>>;
    async fn projects_by_owner(&self, owner_id: i32) -> StoreResult<Vec<Project>>;
    async fn projects_by_participant(&self, user_id: i32) -> StoreResult<Vec<Project>>;
    async fn insert_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn update_project(&self, id: i32, patch: ProjectPatch) -> StoreResult<Option<Project>>;
    /// Removes the project together with its sprints and work items.
    async fn delete_project(&self, id: i32) -> StoreResult<bool>;
    /// False when the link already exists or either side is missing.
    async fn add_participant(&self, project_id: i32, user_id: i32) -> StoreResult<bool>;
    async fn remove_participant(&self, project_id: i32, user_id: i32) -> StoreResult<bool>;
}

#[async_trait]
pub trait SprintRepository: Send + Sync {
    async fn sprint_by_id(&self, id: i32) -> StoreResult<Option<Sprint>>;
    async fn sprint_by_name(&self, name: &str, project_id: i32) -> StoreResult<Option<Sprint>>;
    async fn all_sprints(&self) -> StoreResult<Vec<Sprint>>;
    async fn sprints_by_project(&self, project_id: i32) -> StoreResult<Vec<Sprint>>;
    async fn sprints_active_at(&self, at: DateTime<Utc>) -> StoreResult<Vec<Sprint>>;
    async fn sprints_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<Sprint>>;
    async fn insert_sprint(&self, sprint: NewSprint) -> StoreResult<Sprint>;
    async fn update_sprint(&self, id: i32, patch: SprintPatch) -> StoreResult<Option<Sprint>>;
    async fn delete_sprint(&self, id: i32) -> StoreResult<bool>;
    async fn sprint_has_work_items(&self, id: i32) -> StoreResult<bool>;
}

#[async_trait]
pub trait WorkItemRepository: Send + Sync {
    async fn work_item_by_id(&self, id: i32) -> StoreResult<Option<WorkItem>>;
    async fn all_work_items(&self) -> StoreResult<Vec<WorkItem>>;
    async fn work_items_by_project(&self, project_id: i32) -> StoreResult<Vec<WorkItem>>;
    async fn work_items_by_sprint(&self, sprint_id: i32) -> StoreResult<Vec<WorkItem>>;
    async fn work_items_by_state(&self, state: WorkItemState) -> StoreResult<Vec<WorkItem>>;
    async fn work_items_by_assigned_user(&self, user_id: i32) -> StoreResult<Vec<WorkItem>>;
    async fn insert_work_item(&self, item: NewWorkItem) -> StoreResult<WorkItem>;
    async fn update_work_item(&self, id: i32, patch: WorkItemPatch) -> StoreResult<Option<WorkItem>>;
    async fn delete_work_item(&self, id: i32) -> StoreResult<bool>;
    /// False when the link already exists or either side is missing.
    async fn assign_user(&self, item_id: i32, user_id: i32) -> StoreResult<bool>;
    async fn unassign_user(&self, item_id: i32, user_id: i32) -> StoreResult<bool>;
    /// False when the link already exists or either side is missing.
    async fn add_tag(&self, item_id: i32, tag_id: i32) -> StoreResult<bool>;
    async fn remove_tag(&self, item_id: i32, tag_id: i32) -> StoreResult<bool>;
    /// `None` takes the item out of its sprint.
    async fn set_sprint(&self, item_id: i32, sprint_id: Option<i32>) -> StoreResult<bool>;
    async fn set_index(&self, item_id: i32, index: i32) -> StoreResult<bool>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn tag_by_id(&self, id: i32) -> StoreResult<Option<Tag>>;
    async fn tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>>;
    async fn all_tags(&self) -> StoreResult<Vec<Tag>>;
    async fn insert_tag(&self, name: &str) -> StoreResult<Tag>;
    async fn rename_tag(&self, id: i32, name: &str) -> StoreResult<Option<Tag>>;
    async fn delete_tag(&self, id: i32) -> StoreResult<bool>;
}

/// Everything the services need from a backing store.
#[async_trait]
pub trait Store:
    UserRepository + ProjectRepository + SprintRepository + WorkItemRepository + TagRepository
{
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;
}
