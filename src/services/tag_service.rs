use std::sync::Arc;

use tracing::info;

use crate::database::models::Tag;
use crate::database::repository::TagRepository;
use crate::database::Store;
use crate::messages::Message;
use crate::outcome::Outcome;
use crate::services::{guard, required};

#[derive(Clone)]
pub struct TagService {
    store: Arc<dyn Store>,
}

impl TagService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_tag_by_id(&self, id: i32) -> Outcome<Tag> {
        guard("get_tag_by_id", async {
            Ok(match self.store.tag_by_id(id).await? {
                Some(tag) => Outcome::success(tag),
                None => Outcome::not_found(Message::TagNotFound),
            })
        })
        .await
    }

    pub async fn get_tag_by_name(&self, name: &str) -> Outcome<Tag> {
        guard("get_tag_by_name", async {
            Ok(match self.store.tag_by_name(name).await? {
                Some(tag) => Outcome::success(tag),
                None => Outcome::not_found(Message::TagNotFound),
            })
        })
        .await
    }

    pub async fn get_all_tags(&self) -> Outcome<Vec<Tag>> {
        guard("get_all_tags", async {
            let tags = self.store.all_tags().await?;
            if tags.is_empty() {
                return Ok(Outcome::not_found(Message::TagsNotFound));
            }
            Ok(Outcome::success(tags))
        })
        .await
    }

    pub async fn create_tag(&self, name: &str) -> Outcome<Tag> {
        let Some(name) = required(name) else {
            return Outcome::bad_request(Message::TagNameRequired);
        };

        guard("create_tag", async {
            if self.store.tag_by_name(name).await?.is_some() {
                return Ok(Outcome::conflict(Message::TagNameAlreadyExists));
            }
            let tag = self.store.insert_tag(name).await?;
            info!(tag_id = tag.id, name = %tag.name, "created tag");
            Ok(Outcome::success(tag))
        })
        .await
    }

    /// Renames a tag. Renaming onto another tag's name is a conflict.
    pub async fn update_tag(&self, id: i32, name: Option<&str>) -> Outcome<Tag> {
        let Some(name) = name.and_then(required) else {
            return Outcome::bad_request(Message::TagNoNameSpecified);
        };

        guard("update_tag", async {
            if self.store.tag_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found(Message::TagNotFound));
            }
            if let Some(existing) = self.store.tag_by_name(name).await? {
                if existing.id != id {
                    return Ok(Outcome::conflict(Message::TagNameAlreadyExists));
                }
            }
            Ok(match self.store.rename_tag(id, name).await? {
                Some(tag) => {
                    info!(tag_id = id, name = %tag.name, "renamed tag");
                    Outcome::success(tag)
                }
                None => Outcome::not_found(Message::TagNotFound),
            })
        })
        .await
    }

    /// Detaches the tag from every work item before removing it.
    pub async fn delete_tag(&self, id: i32) -> Outcome {
        guard("delete_tag", async {
            if self.store.tag_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found(Message::TagNotFound));
            }
            if !self.store.delete_tag(id).await? {
                return Ok(Outcome::failure(Message::TagDeleteFailed));
            }
            info!(tag_id = id, "deleted tag");
            Ok(Outcome::success(()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::WorkItemRepository;
    use crate::outcome::ErrorKind;
    use crate::testing::{memory_store, seed_project, seed_user, seed_work_item};

    #[tokio::test]
    async fn create_and_lookup() {
        let tags = TagService::new(memory_store());
        assert_eq!(tags.get_all_tags().await.error_message(), "No tags found.");

        let urgent = tags.create_tag("  urgent ").await.into_result().unwrap();
        assert_eq!(urgent.name, "urgent");
        assert_eq!(tags.get_tag_by_name("urgent").await, Outcome::success(urgent.clone()));
        assert_eq!(tags.get_tag_by_id(urgent.id).await, Outcome::success(urgent.clone()));
        assert_eq!(tags.get_tag_by_id(999).await.error_message(), "Tag not found.");

        let dup = tags.create_tag("urgent").await;
        assert_eq!(dup.error_kind(), ErrorKind::Conflict);
        assert_eq!(dup.error_message(), "Tag name already exists.");
        assert_eq!(tags.create_tag("").await.error_message(), "Tag name is required.");
    }

    #[tokio::test]
    async fn rename_rules() {
        let tags = TagService::new(memory_store());
        let urgent = tags.create_tag("urgent").await.into_result().unwrap();
        tags.create_tag("later").await.into_result().unwrap();

        assert_eq!(tags.update_tag(urgent.id, None).await.error_message(), "New tag name must be specified.");
        assert_eq!(tags.update_tag(urgent.id, Some(" ")).await.error_kind(), ErrorKind::BadRequest);
        assert_eq!(tags.update_tag(urgent.id, Some("later")).await.error_kind(), ErrorKind::Conflict);
        assert_eq!(tags.update_tag(999, Some("fresh")).await.error_kind(), ErrorKind::NotFound);
        // a missing tag is reported before any name clash
        assert_eq!(tags.update_tag(999, Some("later")).await.error_kind(), ErrorKind::NotFound);

        let renamed = tags.update_tag(urgent.id, Some("critical")).await.into_result().unwrap();
        assert_eq!(renamed.name, "critical");
        // keeping the same name is allowed
        assert!(tags.update_tag(urgent.id, Some("critical")).await.is_success());
    }

    #[tokio::test]
    async fn delete_detaches_from_work_items() {
        let store = memory_store();
        let owner = seed_user(&store, "owner").await;
        let project = seed_project(&store, "Apollo", owner.id).await;
        let item = seed_work_item(&store, "Launch", project.id, None).await;
        let tags = TagService::new(store.clone());
        let urgent = tags.create_tag("urgent").await.into_result().unwrap();
        store.add_tag(item.id, urgent.id).await.unwrap();

        assert!(tags.delete_tag(urgent.id).await.is_success());
        let item = store.work_item_by_id(item.id).await.unwrap().unwrap();
        assert!(item.tag_ids.is_empty());
        assert_eq!(tags.delete_tag(urgent.id).await.error_kind(), ErrorKind::NotFound);
    }
}
