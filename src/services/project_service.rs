use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::database::models::{Project, User};
use crate::database::repository::{NewProject, ProjectPatch, ProjectRepository, UserRepository};
use crate::database::Store;
use crate::messages::{Entity, Message};
use crate::outcome::Outcome;
use crate::services::{guard, required};

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_all_projects(&self) -> Outcome<Vec<Project>> {
        guard("get_all_projects", async {
            let projects = self.store.all_projects().await?;
            if projects.is_empty() {
                return Ok(Outcome::not_found_entity(Entity::Project, true));
            }
            Ok(Outcome::success(projects))
        })
        .await
    }

    pub async fn get_project_by_id(&self, id: i32) -> Outcome<Project> {
        guard("get_project_by_id", async {
            Ok(match self.store.project_by_id(id).await? {
                Some(project) => Outcome::success(project),
                None => Outcome::not_found_entity(Entity::Project, false),
            })
        })
        .await
    }

    pub async fn get_project_by_name(&self, name: &str) -> Outcome<Project> {
        guard("get_project_by_name", async {
            Ok(match self.store.project_by_name(name).await? {
                Some(project) => Outcome::success(project),
                None => Outcome::not_found_entity(Entity::Project, false),
            })
        })
        .await
    }

    /// May be empty.
    pub async fn get_projects_by_owner(&self, owner_id: i32) -> Outcome<Vec<Project>> {
        guard("get_projects_by_owner", async {
            Ok(Outcome::success(self.store.projects_by_owner(owner_id).await?))
        })
        .await
    }

    /// May be empty.
    pub async fn get_projects_by_participant(&self, user_id: i32) -> Outcome<Vec<Project>> {
        guard("get_projects_by_participant", async {
            Ok(Outcome::success(self.store.projects_by_participant(user_id).await?))
        })
        .await
    }

    /// Projects the user owns or participates in, without duplicates.
    pub async fn get_projects_for_user(&self, user_id: i32) -> Outcome<Vec<Project>> {
        guard("get_projects_for_user", async {
            let mut projects = self.store.projects_by_owner(user_id).await?;
            for project in self.store.projects_by_participant(user_id).await? {
                if !projects.iter().any(|p| p.id == project.id) {
                    projects.push(project);
                }
            }
            if projects.is_empty() {
                return Ok(Outcome::not_found(Message::NoProjectsFoundForUser));
            }
            projects.sort_by_key(|p| p.id);
            Ok(Outcome::success(projects))
        })
        .await
    }

    pub async fn get_participants(&self, project_id: i32) -> Outcome<Vec<User>> {
        guard("get_participants", async {
            let Some(project) = self.store.project_by_id(project_id).await? else {
                return Ok(Outcome::not_found_entity(Entity::Project, false));
            };
            Ok(Outcome::success(self.store.users_by_ids(&project.participant_ids).await?))
        })
        .await
    }

    pub async fn create_project(&self, name: &str, description: &str, owner_id: i32) -> Outcome<Project> {
        let Some(name) = required(name) else {
            return Outcome::bad_request(Message::ProjectNameRequired);
        };

        guard("create_project", async {
            if self.store.project_by_name(name).await?.is_some() {
                return Ok(Outcome::conflict(Message::ProjectNameExists(name.to_string())));
            }

            let project = self
                .store
                .insert_project(NewProject {
                    name: name.to_string(),
                    description: description.trim().to_string(),
                    owner_id,
                    created_at: Utc::now(),
                })
                .await?;

            info!(project_id = project.id, owner_id, "created project");
            Ok(Outcome::success(project))
        })
        .await
    }

    pub async fn update_project(&self, id: i32, patch: ProjectPatch) -> Outcome<Project> {
        if patch.is_empty() {
            return Outcome::bad_request(Message::ProjectNoFieldsSpecified);
        }

        guard("update_project", async {
            if self.store.project_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found_entity(Entity::Project, false));
            }
            if let Some(name) = patch.name.as_deref().and_then(required) {
                if let Some(existing) = self.store.project_by_name(name).await? {
                    if existing.id != id {
                        return Ok(Outcome::conflict(Message::ProjectNameExists(name.to_string())));
                    }
                }
            }

            Ok(match self.store.update_project(id, patch).await? {
                Some(project) => {
                    info!(project_id = id, "updated project");
                    Outcome::success(project)
                }
                None => Outcome::not_found_entity(Entity::Project, false),
            })
        })
        .await
    }

    /// Sprints and work items are removed with the project.
    pub async fn delete_project(&self, id: i32) -> Outcome {
        guard("delete_project", async {
            if self.store.project_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found_entity(Entity::Project, false));
            }
            if !self.store.delete_project(id).await? {
                return Ok(Outcome::failure(Message::ProjectDeleteFailed));
            }
            info!(project_id = id, "deleted project");
            Ok(Outcome::success(()))
        })
        .await
    }

    /// Fails when either side is missing, the user owns the project, or is
    /// already a participant.
    pub async fn add_participant(&self, project_id: i32, user_id: i32) -> Outcome {
        guard("add_participant", async {
            let Some(project) = self.store.project_by_id(project_id).await? else {
                return Ok(Outcome::bad_request(Message::AddParticipantFailed));
            };
            if project.is_member(user_id) || self.store.user_by_id(user_id).await?.is_none() {
                return Ok(Outcome::bad_request(Message::AddParticipantFailed));
            }
            if !self.store.add_participant(project_id, user_id).await? {
                return Ok(Outcome::bad_request(Message::AddParticipantFailed));
            }
            info!(project_id, user_id, "added participant");
            Ok(Outcome::success(()))
        })
        .await
    }

    pub async fn remove_participant(&self, project_id: i32, user_id: i32) -> Outcome {
        guard("remove_participant", async {
            if !self.store.remove_participant(project_id, user_id).await? {
                return Ok(Outcome::bad_request(Message::RemoveParticipantFailed));
            }
            info!(project_id, user_id, "removed participant");
            Ok(Outcome::success(()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::{SprintRepository, WorkItemRepository};
    use crate::outcome::ErrorKind;
    use crate::testing::{memory_store, seed_sprint, seed_user, seed_work_item};

    #[tokio::test]
    async fn create_get_and_duplicate() {
        let store = memory_store();
        let owner = seed_user(&store, "owner").await;
        let projects = ProjectService::new(store.clone());

        assert_eq!(
            projects.get_all_projects().await.error_message(),
            "No Projects found."
        );

        let apollo = projects.create_project("Apollo", "moon", owner.id).await.into_result().unwrap();
        assert_eq!(apollo.owner_id, owner.id);
        assert_eq!(projects.get_project_by_id(apollo.id).await, Outcome::success(apollo.clone()));
        assert_eq!(projects.get_project_by_name("Apollo").await.data().map(|p| p.id), Some(apollo.id));

        let dup = projects.create_project("Apollo", "again", owner.id).await;
        assert_eq!(dup.error_kind(), ErrorKind::Conflict);
        assert_eq!(dup.error_message(), "A project with the name 'Apollo' already exists.");

        let blank = projects.create_project("  ", "", owner.id).await;
        assert_eq!(blank.error_kind(), ErrorKind::BadRequest);

        let missing = projects.get_project_by_id(apollo.id + 100).await;
        assert_eq!(missing.error_message(), "Could not find Project.");
    }

    #[tokio::test]
    async fn empty_update_is_rejected_without_mutation() {
        let store = memory_store();
        let owner = seed_user(&store, "owner").await;
        let projects = ProjectService::new(store.clone());
        let apollo = projects.create_project("Apollo", "moon", owner.id).await.into_result().unwrap();

        let outcome = projects.update_project(apollo.id, ProjectPatch::default()).await;
        assert_eq!(outcome.error_kind(), ErrorKind::BadRequest);
        assert_eq!(projects.get_project_by_id(apollo.id).await, Outcome::success(apollo.clone()));

        let renamed = projects
            .update_project(apollo.id, ProjectPatch { name: Some("Artemis".into()), description: Some("".into()) })
            .await
            .into_result()
            .unwrap();
        assert_eq!(renamed.name, "Artemis");
        assert_eq!(renamed.description, "moon");

        let missing = projects
            .update_project(999, ProjectPatch { name: Some("X".into()), description: None })
            .await;
        assert_eq!(missing.error_kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_cascades_even_with_work_items() {
        let store = memory_store();
        let owner = seed_user(&store, "owner").await;
        let projects = ProjectService::new(store.clone());
        let apollo = projects.create_project("Apollo", "", owner.id).await.into_result().unwrap();
        let sprint = seed_sprint(&store, "S1", apollo.id, 1, 14).await;
        seed_work_item(&store, "Item", apollo.id, Some(sprint.id)).await;

        assert!(projects.delete_project(apollo.id).await.is_success());
        assert!(store.sprint_by_id(sprint.id).await.unwrap().is_none());
        assert!(store.all_work_items().await.unwrap().is_empty());
        assert_eq!(projects.delete_project(apollo.id).await.error_kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn participant_management() {
        let store = memory_store();
        let owner = seed_user(&store, "owner").await;
        let member = seed_user(&store, "member").await;
        let projects = ProjectService::new(store.clone());
        let apollo = projects.create_project("Apollo", "", owner.id).await.into_result().unwrap();

        assert!(projects.add_participant(apollo.id, member.id).await.is_success());
        let again = projects.add_participant(apollo.id, member.id).await;
        assert_eq!(again.error_message(), "Failed to add participant.");
        assert_eq!(projects.add_participant(apollo.id, owner.id).await.error_kind(), ErrorKind::BadRequest);
        assert_eq!(projects.add_participant(apollo.id, 999).await.error_kind(), ErrorKind::BadRequest);
        assert_eq!(projects.add_participant(999, member.id).await.error_kind(), ErrorKind::BadRequest);

        let participants = projects.get_participants(apollo.id).await.into_result().unwrap();
        assert_eq!(participants.iter().map(|u| u.id).collect::<Vec<_>>(), vec![member.id]);

        let mine = projects.get_projects_for_user(member.id).await.into_result().unwrap();
        assert_eq!(mine.len(), 1);
        assert!(projects.get_projects_by_owner(member.id).await.into_result().unwrap().is_empty());

        assert!(projects.remove_participant(apollo.id, member.id).await.is_success());
        let gone = projects.remove_participant(apollo.id, member.id).await;
        assert_eq!(gone.error_message(), "Failed to remove participant.");
        assert_eq!(
            projects.get_projects_for_user(member.id).await.error_kind(),
            ErrorKind::NotFound
        );
    }
}
