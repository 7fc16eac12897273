//! In-process store used when no database is configured and by the tests.
//!
//! Uniqueness is not enforced here: services check-then-insert, so two racing
//! creates with the same name can both land.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::database::models::{Project, Sprint, Tag, User, WorkItem, WorkItemState};
use crate::database::repository::{
    non_blank, NewProject, NewSprint, NewUser, NewWorkItem, ProjectPatch, ProjectRepository,
    SprintPatch, SprintRepository, Store, StoreResult, TagRepository, UserPatch, UserRepository,
    WorkItemPatch, WorkItemRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    projects: BTreeMap<i32, Project>,
    sprints: BTreeMap<i32, Sprint>,
    work_items: BTreeMap<i32, WorkItem>,
    tags: BTreeMap<i32, Tag>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_sprints<'a>(sprints: impl Iterator<Item = &'a Sprint>) -> Vec<Sprint> {
    let mut out: Vec<Sprint> = sprints.cloned().collect();
    out.sort_by_key(|s| (s.start_date, s.id));
    out
}

fn sorted_items<'a>(items: impl Iterator<Item = &'a WorkItem>) -> Vec<WorkItem> {
    let mut out: Vec<WorkItem> = items.cloned().collect();
    out.sort_by_key(|w| (w.index, w.id));
    out
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn user_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn all_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            salt: user.salt,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = non_blank(&patch.username) {
            user.username = username.to_string();
        }
        if let Some(email) = non_blank(&patch.email) {
            user.email = email.to_string();
        }
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: i32, password_hash: &str, salt: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.salt = salt.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        for project in tables.projects.values_mut() {
            project.participant_ids.retain(|uid| *uid != id);
        }
        for item in tables.work_items.values_mut() {
            item.assigned_user_ids.retain(|uid| *uid != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn project_by_id(&self, id: i32) -> StoreResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn project_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.values().find(|p| p.name == name).cloned())
    }

    async fn all_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.tables.read().await.projects.values().cloned().collect())
    }

    async fn projects_by_owner(&self, owner_id: i32) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn projects_by_participant(&self, user_id: i32) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.is_participant(user_id))
            .cloned()
            .collect())
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let project = Project {
            id,
            name: project.name,
            description: project.description,
            created_at: project.created_at,
            owner_id: project.owner_id,
            participant_ids: Vec::new(),
        };
        tables.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: i32, patch: ProjectPatch) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = non_blank(&patch.name) {
            project.name = name.to_string();
        }
        if let Some(description) = non_blank(&patch.description) {
            project.description = description.to_string();
        }
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.projects.remove(&id).is_none() {
            return Ok(false);
        }
        tables.sprints.retain(|_, s| s.project_id != id);
        tables.work_items.retain(|_, w| w.project_id != id);
        Ok(true)
    }

    async fn add_participant(&self, project_id: i32, user_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Ok(false);
        }
        match tables.projects.get_mut(&project_id) {
            Some(project) if !project.participant_ids.contains(&user_id) => {
                project.participant_ids.push(user_id);
                project.participant_ids.sort_unstable();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_participant(&self, project_id: i32, user_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.projects.get_mut(&project_id) else {
            return Ok(false);
        };
        let before = project.participant_ids.len();
        project.participant_ids.retain(|uid| *uid != user_id);
        Ok(project.participant_ids.len() != before)
    }
}

#[async_trait]
impl SprintRepository for MemoryStore {
    async fn sprint_by_id(&self, id: i32) -> StoreResult<Option<Sprint>> {
        Ok(self.tables.read().await.sprints.get(&id).cloned())
    }

    async fn sprint_by_name(&self, name: &str, project_id: i32) -> StoreResult<Option<Sprint>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sprints
            .values()
            .find(|s| s.name == name && s.project_id == project_id)
            .cloned())
    }

    async fn all_sprints(&self) -> StoreResult<Vec<Sprint>> {
        Ok(sorted_sprints(self.tables.read().await.sprints.values()))
    }

    async fn sprints_by_project(&self, project_id: i32) -> StoreResult<Vec<Sprint>> {
        let tables = self.tables.read().await;
        Ok(sorted_sprints(
            tables.sprints.values().filter(|s| s.project_id == project_id),
        ))
    }

    async fn sprints_active_at(&self, at: DateTime<Utc>) -> StoreResult<Vec<Sprint>> {
        let tables = self.tables.read().await;
        Ok(sorted_sprints(tables.sprints.values().filter(|s| s.is_active_at(at))))
    }

    async fn sprints_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<Sprint>> {
        let tables = self.tables.read().await;
        Ok(sorted_sprints(
            tables.sprints.values().filter(|s| s.overlaps(start, end)),
        ))
    }

    async fn insert_sprint(&self, sprint: NewSprint) -> StoreResult<Sprint> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let sprint = Sprint {
            id,
            name: sprint.name,
            description: sprint.description,
            start_date: sprint.start_date,
            end_date: sprint.end_date,
            project_id: sprint.project_id,
        };
        tables.sprints.insert(id, sprint.clone());
        Ok(sprint)
    }

    async fn update_sprint(&self, id: i32, patch: SprintPatch) -> StoreResult<Option<Sprint>> {
        let mut tables = self.tables.write().await;
        let Some(sprint) = tables.sprints.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = non_blank(&patch.name) {
            sprint.name = name.to_string();
        }
        if let Some(description) = non_blank(&patch.description) {
            sprint.description = description.to_string();
        }
        if let Some(start) = patch.start_date {
            sprint.start_date = start;
        }
        if let Some(end) = patch.end_date {
            sprint.end_date = end;
        }
        Ok(Some(sprint.clone()))
    }

    async fn delete_sprint(&self, id: i32) -> StoreResult<bool> {
        Ok(self.tables.write().await.sprints.remove(&id).is_some())
    }

    async fn sprint_has_work_items(&self, id: i32) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.work_items.values().any(|w| w.sprint_id == Some(id)))
    }
}

#[async_trait]
impl WorkItemRepository for MemoryStore {
    async fn work_item_by_id(&self, id: i32) -> StoreResult<Option<WorkItem>> {
        Ok(self.tables.read().await.work_items.get(&id).cloned())
    }

    async fn all_work_items(&self) -> StoreResult<Vec<WorkItem>> {
        Ok(sorted_items(self.tables.read().await.work_items.values()))
    }

    async fn work_items_by_project(&self, project_id: i32) -> StoreResult<Vec<WorkItem>> {
        let tables = self.tables.read().await;
        Ok(sorted_items(
            tables.work_items.values().filter(|w| w.project_id == project_id),
        ))
    }

    async fn work_items_by_sprint(&self, sprint_id: i32) -> StoreResult<Vec<WorkItem>> {
        let tables = self.tables.read().await;
        Ok(sorted_items(
            tables.work_items.values().filter(|w| w.sprint_id == Some(sprint_id)),
        ))
    }

    async fn work_items_by_state(&self, state: WorkItemState) -> StoreResult<Vec<WorkItem>> {
        let tables = self.tables.read().await;
        Ok(sorted_items(tables.work_items.values().filter(|w| w.state == state)))
    }

    async fn work_items_by_assigned_user(&self, user_id: i32) -> StoreResult<Vec<WorkItem>> {
        let tables = self.tables.read().await;
        Ok(sorted_items(
            tables
                .work_items
                .values()
                .filter(|w| w.assigned_user_ids.contains(&user_id)),
        ))
    }

    async fn insert_work_item(&self, item: NewWorkItem) -> StoreResult<WorkItem> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let item = WorkItem {
            id,
            name: item.name,
            description: item.description,
            state: item.state,
            index: item.index,
            project_id: item.project_id,
            sprint_id: item.sprint_id,
            assigned_user_ids: Vec::new(),
            tag_ids: Vec::new(),
        };
        tables.work_items.insert(id, item.clone());
        Ok(item)
    }

    async fn update_work_item(&self, id: i32, patch: WorkItemPatch) -> StoreResult<Option<WorkItem>> {
        let mut tables = self.tables.write().await;
        let Some(item) = tables.work_items.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = non_blank(&patch.name) {
            item.name = name.to_string();
        }
        if let Some(description) = non_blank(&patch.description) {
            item.description = description.to_string();
        }
        if let Some(state) = patch.state {
            item.state = state;
        }
        if let Some(index) = patch.index {
            item.index = index;
        }
        if let Some(sprint_id) = patch.sprint_id {
            item.sprint_id = Some(sprint_id);
        }
        Ok(Some(item.clone()))
    }

    async fn delete_work_item(&self, id: i32) -> StoreResult<bool> {
        Ok(self.tables.write().await.work_items.remove(&id).is_some())
    }

    async fn assign_user(&self, item_id: i32, user_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Ok(false);
        }
        match tables.work_items.get_mut(&item_id) {
            Some(item) if !item.assigned_user_ids.contains(&user_id) => {
                item.assigned_user_ids.push(user_id);
                item.assigned_user_ids.sort_unstable();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn unassign_user(&self, item_id: i32, user_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(item) = tables.work_items.get_mut(&item_id) else {
            return Ok(false);
        };
        let before = item.assigned_user_ids.len();
        item.assigned_user_ids.retain(|uid| *uid != user_id);
        Ok(item.assigned_user_ids.len() != before)
    }

    async fn add_tag(&self, item_id: i32, tag_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.tags.contains_key(&tag_id) {
            return Ok(false);
        }
        match tables.work_items.get_mut(&item_id) {
            Some(item) if !item.tag_ids.contains(&tag_id) => {
                item.tag_ids.push(tag_id);
                item.tag_ids.sort_unstable();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_tag(&self, item_id: i32, tag_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(item) = tables.work_items.get_mut(&item_id) else {
            return Ok(false);
        };
        let before = item.tag_ids.len();
        item.tag_ids.retain(|tid| *tid != tag_id);
        Ok(item.tag_ids.len() != before)
    }

    async fn set_sprint(&self, item_id: i32, sprint_id: Option<i32>) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.work_items.get_mut(&item_id) {
            Some(item) => {
                item.sprint_id = sprint_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_index(&self, item_id: i32, index: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.work_items.get_mut(&item_id) {
            Some(item) => {
                item.index = index;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn tag_by_id(&self, id: i32) -> StoreResult<Option<Tag>> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.name == name).cloned())
    }

    async fn all_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(self.tables.read().await.tags.values().cloned().collect())
    }

    async fn insert_tag(&self, name: &str) -> StoreResult<Tag> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let tag = Tag {
            id,
            name: name.to_string(),
        };
        tables.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn rename_tag(&self, id: i32, name: &str) -> StoreResult<Option<Tag>> {
        let mut tables = self.tables.write().await;
        Ok(tables.tags.get_mut(&id).map(|tag| {
            tag.name = name.to_string();
            tag.clone()
        }))
    }

    async fn delete_tag(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.tags.remove(&id).is_none() {
            return Ok(false);
        }
        for item in tables.work_items.values_mut() {
            item.tag_ids.retain(|tid| *tid != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
