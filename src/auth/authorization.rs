//! Who may read or change what.
//!
//! Two project checks (access and modify) plus self-only user modification.
//! Each returns `Outcome<bool>` so a missing caller or project stays
//! distinguishable from a plain "no".

use std::sync::Arc;

use crate::database::models::Project;
use crate::database::repository::{ProjectRepository, UserRepository};
use crate::database::{Store, StoreResult};
use crate::messages::{Entity, Message};
use crate::outcome::Outcome;
use crate::services::guard;

#[derive(Clone)]
pub struct AuthorizationService {
    store: Arc<dyn Store>,
}

impl AuthorizationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Owner or participant.
    pub async fn can_access_project(&self, user_id: i32, project_id: i32) -> Outcome<bool> {
        guard("can_access_project", async {
            Ok(self
                .caller_and_project(user_id, project_id)
                .await?
                .map(|project| project.is_member(user_id)))
        })
        .await
    }

    /// Owner only.
    pub async fn can_modify_project(&self, user_id: i32, project_id: i32) -> Outcome<bool> {
        guard("can_modify_project", async {
            Ok(self
                .caller_and_project(user_id, project_id)
                .await?
                .map(|project| project.is_owner(user_id)))
        })
        .await
    }

    /// Users may only modify themselves.
    pub fn can_modify_user(&self, current_user_id: i32, target_user_id: i32) -> Outcome<bool> {
        Outcome::success(current_user_id == target_user_id)
    }

    async fn caller_and_project(&self, user_id: i32, project_id: i32) -> StoreResult<Outcome<Project>> {
        if self.store.user_by_id(user_id).await?.is_none() {
            return Ok(Outcome::unauthorized(Message::NotFound(Entity::User)));
        }
        Ok(match self.store.project_by_id(project_id).await? {
            Some(project) => Outcome::success(project),
            None => Outcome::not_found_entity(Entity::Project, false),
        })
    }
}
