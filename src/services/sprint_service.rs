use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::database::models::Sprint;
use crate::database::repository::{NewSprint, SprintPatch, SprintRepository};
use crate::database::Store;
use crate::messages::{Entity, Message};
use crate::outcome::Outcome;
use crate::services::{guard, required};

/// Input for [`SprintService::create_sprint`].
#[derive(Debug, Clone)]
pub struct SprintDraft {
    pub name: String,
    pub description: String,
    pub project_id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SprintService {
    store: Arc<dyn Store>,
}

impl SprintService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_all_sprints(&self) -> Outcome<Vec<Sprint>> {
        guard("get_all_sprints", async {
            let sprints = self.store.all_sprints().await?;
            if sprints.is_empty() {
                return Ok(Outcome::not_found_entity(Entity::Sprint, true));
            }
            Ok(Outcome::success(sprints))
        })
        .await
    }

    pub async fn get_sprint_by_id(&self, id: i32) -> Outcome<Sprint> {
        guard("get_sprint_by_id", async {
            Ok(match self.store.sprint_by_id(id).await? {
                Some(sprint) => Outcome::success(sprint),
                None => Outcome::not_found_entity(Entity::Sprint, false),
            })
        })
        .await
    }

    pub async fn get_sprint_by_name(&self, name: &str, project_id: i32) -> Outcome<Sprint> {
        guard("get_sprint_by_name", async {
            Ok(match self.store.sprint_by_name(name, project_id).await? {
                Some(sprint) => Outcome::success(sprint),
                None => Outcome::not_found_entity(Entity::Sprint, false),
            })
        })
        .await
    }

    pub async fn get_sprints_by_project(&self, project_id: i32) -> Outcome<Vec<Sprint>> {
        guard("get_sprints_by_project", async {
            let sprints = self.store.sprints_by_project(project_id).await?;
            if sprints.is_empty() {
                return Ok(Outcome::not_found(Message::NoSprintsFoundForProject));
            }
            Ok(Outcome::success(sprints))
        })
        .await
    }

    /// Sprints whose window contains the current instant.
    pub async fn get_active_sprints(&self) -> Outcome<Vec<Sprint>> {
        guard("get_active_sprints", async {
            Ok(Outcome::success(self.store.sprints_active_at(Utc::now()).await?))
        })
        .await
    }

    /// Sprints intersecting `[start, end]`.
    pub async fn get_sprints_by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Outcome<Vec<Sprint>> {
        if start >= end {
            return Outcome::bad_request(Message::InvalidDateRange);
        }

        guard("get_sprints_by_date_range", async {
            Ok(Outcome::success(self.store.sprints_overlapping(start, end).await?))
        })
        .await
    }

    pub async fn create_sprint(&self, draft: SprintDraft) -> Outcome<Sprint> {
        let Some(name) = required(&draft.name) else {
            return Outcome::bad_request(Message::SprintNameRequired);
        };
        if draft.project_id <= 0 {
            return Outcome::bad_request(Message::ProjectIdRequired);
        }
        if draft.start_date >= draft.end_date {
            return Outcome::bad_request(Message::EndDateMustBeAfterStartDate);
        }
        // date-only: any time today is still allowed
        if draft.start_date.date_naive() < Utc::now().date_naive() {
            return Outcome::bad_request(Message::SprintCannotStartInPast);
        }

        guard("create_sprint", async {
            if self.store.sprint_by_name(name, draft.project_id).await?.is_some() {
                return Ok(Outcome::conflict(Message::SprintNameExists(name.to_string())));
            }

            let sprint = self
                .store
                .insert_sprint(NewSprint {
                    name: name.to_string(),
                    description: draft.description.trim().to_string(),
                    start_date: draft.start_date,
                    end_date: draft.end_date,
                    project_id: draft.project_id,
                })
                .await?;

            info!(sprint_id = sprint.id, project_id = sprint.project_id, "created sprint");
            Ok(Outcome::success(sprint))
        })
        .await
    }

    /// The patched start and end must still satisfy start < end.
    pub async fn update_sprint(&self, id: i32, patch: SprintPatch) -> Outcome<Sprint> {
        if patch.is_empty() {
            return Outcome::bad_request(Message::SprintNoFieldsSpecified);
        }

        guard("update_sprint", async {
            let Some(current) = self.store.sprint_by_id(id).await? else {
                return Ok(Outcome::not_found_entity(Entity::Sprint, false));
            };

            let start = patch.start_date.unwrap_or(current.start_date);
            let end = patch.end_date.unwrap_or(current.end_date);
            if start >= end {
                return Ok(Outcome::bad_request(Message::EndDateMustBeAfterStartDate));
            }

            if let Some(name) = patch.name.as_deref().and_then(required) {
                if let Some(existing) = self.store.sprint_by_name(name, current.project_id).await? {
                    if existing.id != id {
                        return Ok(Outcome::conflict(Message::SprintNameExists(name.to_string())));
                    }
                }
            }

            Ok(match self.store.update_sprint(id, patch).await? {
                Some(sprint) => {
                    info!(sprint_id = id, "updated sprint");
                    Outcome::success(sprint)
                }
                None => Outcome::not_found_entity(Entity::Sprint, false),
            })
        })
        .await
    }

    /// Refused while work items still reference the sprint.
    pub async fn delete_sprint(&self, id: i32) -> Outcome {
        guard("delete_sprint", async {
            if self.store.sprint_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found_entity(Entity::Sprint, false));
            }
            if self.store.sprint_has_work_items(id).await? {
                return Ok(Outcome::bad_request(Message::CannotDeleteSprintWithWorkItems));
            }
            if !self.store.delete_sprint(id).await? {
                return Ok(Outcome::failure(Message::SprintDeleteFailed));
            }
            info!(sprint_id = id, "deleted sprint");
            Ok(Outcome::success(()))
        })
        .await
    }
}
