use std::sync::Arc;

use tracing::info;

use crate::database::models::{WorkItem, WorkItemState};
use crate::database::repository::{NewWorkItem, SprintRepository, StoreResult, WorkItemPatch, WorkItemRepository};
use crate::database::Store;
use crate::messages::{Entity, Message};
use crate::outcome::Outcome;
use crate::services::{guard, required};

/// Input for [`WorkItemService::create_work_item`].
#[derive(Debug, Clone)]
pub struct WorkItemDraft {
    pub name: String,
    pub description: String,
    pub project_id: i32,
    pub state: WorkItemState,
    pub sprint_id: Option<i32>,
}

#[derive(Clone)]
pub struct WorkItemService {
    store: Arc<dyn Store>,
}

impl WorkItemService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Failure outcome unless `sprint_id` names a sprint of `project_id`.
    async fn check_sprint<T>(&self, sprint_id: i32, project_id: i32) -> StoreResult<Option<Outcome<T>>> {
        Ok(match self.store.sprint_by_id(sprint_id).await? {
            None => Some(Outcome::not_found_entity(Entity::Sprint, false)),
            Some(sprint) if sprint.project_id != project_id => {
                Some(Outcome::bad_request(Message::SprintNotInProject))
            }
            Some(_) => None,
        })
    }

    pub async fn get_all_work_items(&self) -> Outcome<Vec<WorkItem>> {
        guard("get_all_work_items", async {
            let items = self.store.all_work_items().await?;
            if items.is_empty() {
                return Ok(Outcome::not_found_entity(Entity::WorkItem, true));
            }
            Ok(Outcome::success(items))
        })
        .await
    }

    pub async fn get_work_item_by_id(&self, id: i32) -> Outcome<WorkItem> {
        guard("get_work_item_by_id", async {
            Ok(match self.store.work_item_by_id(id).await? {
                Some(item) => Outcome::success(item),
                None => Outcome::not_found_entity(Entity::WorkItem, false),
            })
        })
        .await
    }

    pub async fn get_work_items_by_project(&self, project_id: i32) -> Outcome<Vec<WorkItem>> {
        guard("get_work_items_by_project", async {
            let items = self.store.work_items_by_project(project_id).await?;
            if items.is_empty() {
                return Ok(Outcome::not_found(Message::NoWorkItemsFoundForProject));
            }
            Ok(Outcome::success(items))
        })
        .await
    }

    pub async fn get_work_items_by_sprint(&self, sprint_id: i32) -> Outcome<Vec<WorkItem>> {
        guard("get_work_items_by_sprint", async {
            Ok(Outcome::success(self.store.work_items_by_sprint(sprint_id).await?))
        })
        .await
    }

    pub async fn get_work_items_by_state(&self, state: WorkItemState) -> Outcome<Vec<WorkItem>> {
        guard("get_work_items_by_state", async {
            Ok(Outcome::success(self.store.work_items_by_state(state).await?))
        })
        .await
    }

    pub async fn get_work_items_by_assigned_user(&self, user_id: i32) -> Outcome<Vec<WorkItem>> {
        guard("get_work_items_by_assigned_user", async {
            Ok(Outcome::success(self.store.work_items_by_assigned_user(user_id).await?))
        })
        .await
    }

    /// New items start at index 0.
    pub async fn create_work_item(&self, draft: WorkItemDraft) -> Outcome<WorkItem> {
        let Some(name) = required(&draft.name) else {
            return Outcome::bad_request(Message::WorkItemNameRequired);
        };
        if draft.project_id <= 0 {
            return Outcome::bad_request(Message::ProjectIdRequired);
        }

        guard("create_work_item", async {
            if let Some(sprint_id) = draft.sprint_id {
                if let Some(failure) = self.check_sprint(sprint_id, draft.project_id).await? {
                    return Ok(failure);
                }
            }
            let item = self
                .store
                .insert_work_item(NewWorkItem {
                    name: name.to_string(),
                    description: draft.description.trim().to_string(),
                    state: draft.state,
                    index: 0,
                    project_id: draft.project_id,
                    sprint_id: draft.sprint_id,
                })
                .await?;

            info!(work_item_id = item.id, project_id = item.project_id, "created work item");
            Ok(Outcome::success(item))
        })
        .await
    }

    pub async fn update_work_item(&self, id: i32, patch: WorkItemPatch) -> Outcome<WorkItem> {
        if patch.is_empty() {
            return Outcome::bad_request(Message::WorkItemNoFieldsSpecified);
        }
        if patch.index.is_some_and(|index| index < 0) {
            return Outcome::bad_request(Message::InvalidIndex);
        }

        guard("update_work_item", async {
            let Some(current) = self.store.work_item_by_id(id).await? else {
                return Ok(Outcome::not_found_entity(Entity::WorkItem, false));
            };
            if let Some(sprint_id) = patch.sprint_id {
                if let Some(failure) = self.check_sprint(sprint_id, current.project_id).await? {
                    return Ok(failure);
                }
            }
            Ok(match self.store.update_work_item(id, patch).await? {
                Some(item) => {
                    info!(work_item_id = id, "updated work item");
                    Outcome::success(item)
                }
                None => Outcome::not_found_entity(Entity::WorkItem, false),
            })
        })
        .await
    }

    pub async fn delete_work_item(&self, id: i32) -> Outcome {
        guard("delete_work_item", async {
            if self.store.work_item_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found_entity(Entity::WorkItem, false));
            }
            if !self.store.delete_work_item(id).await? {
                return Ok(Outcome::failure(Message::WorkItemDeleteFailed));
            }
            info!(work_item_id = id, "deleted work item");
            Ok(Outcome::success(()))
        })
        .await
    }

    pub async fn assign_user(&self, item_id: i32, user_id: i32) -> Outcome {
        guard("assign_user", async {
            if !self.store.assign_user(item_id, user_id).await? {
                return Ok(Outcome::bad_request(Message::AssignmentFailed));
            }
            info!(work_item_id = item_id, user_id, "assigned user");
            Ok(Outcome::success(()))
        })
        .await
    }

    pub async fn unassign_user(&self, item_id: i32, user_id: i32) -> Outcome {
        guard("unassign_user", async {
            if !self.store.unassign_user(item_id, user_id).await? {
                return Ok(Outcome::bad_request(Message::UnassignmentFailed));
            }
            info!(work_item_id = item_id, user_id, "unassigned user");
            Ok(Outcome::success(()))
        })
        .await
    }

    pub async fn add_tag(&self, item_id: i32, tag_id: i32) -> Outcome {
        guard("add_tag", async {
            if !self.store.add_tag(item_id, tag_id).await? {
                return Ok(Outcome::bad_request(Message::AddTagFailed));
            }
            Ok(Outcome::success(()))
        })
        .await
    }

    pub async fn remove_tag(&self, item_id: i32, tag_id: i32) -> Outcome {
        guard("remove_tag", async {
            if !self.store.remove_tag(item_id, tag_id).await? {
                return Ok(Outcome::bad_request(Message::RemoveTagFailed));
            }
            Ok(Outcome::success(()))
        })
        .await
    }

    /// `None` moves the item back to the backlog.
    pub async fn move_to_sprint(&self, item_id: i32, sprint_id: Option<i32>) -> Outcome {
        guard("move_to_sprint", async {
            let Some(item) = self.store.work_item_by_id(item_id).await? else {
                return Ok(Outcome::not_found_entity(Entity::WorkItem, false));
            };
            if let Some(sprint_id) = sprint_id {
                if let Some(failure) = self.check_sprint(sprint_id, item.project_id).await? {
                    return Ok(failure);
                }
            }
            if !self.store.set_sprint(item_id, sprint_id).await? {
                return Ok(Outcome::not_found_entity(Entity::WorkItem, false));
            }
            info!(work_item_id = item_id, ?sprint_id, "moved work item");
            Ok(Outcome::success(()))
        })
        .await
    }

    /// Negative indexes are rejected before the store is touched.
    pub async fn update_index(&self, item_id: i32, index: i32) -> Outcome {
        if index < 0 {
            return Outcome::bad_request(Message::InvalidIndex);
        }

        guard("update_index", async {
            if !self.store.set_index(item_id, index).await? {
                return Ok(Outcome::not_found_entity(Entity::WorkItem, false));
            }
            Ok(Outcome::success(()))
        })
        .await
    }
}
