use std::sync::Arc;

use tracing::{error, info};

use crate::auth::{HashedPassword, PasswordHasher};
use crate::database::models::User;
use crate::database::repository::{NewUser, ProjectRepository, UserPatch, UserRepository};
use crate::database::Store;
use crate::messages::Message;
use crate::outcome::Outcome;
use crate::services::{guard, required};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Outcome<User> {
        let (Some(username), Some(email)) = (required(username), required(email)) else {
            return Outcome::bad_request(Message::UsernamePasswordEmailRequired);
        };
        if password.is_empty() {
            return Outcome::bad_request(Message::UsernamePasswordEmailRequired);
        }

        guard("register_user", async {
            if self.store.user_by_username(username).await?.is_some() {
                return Ok(Outcome::conflict(Message::UsernameAlreadyExists));
            }

            let Some(hashed) = self.hash(password) else {
                return Ok(Outcome::failure(Message::InternalServerError));
            };

            let user = self
                .store
                .insert_user(NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash: hashed.hash,
                    salt: hashed.salt,
                })
                .await?;

            info!(user_id = user.id, username = %user.username, "registered user");
            Ok(Outcome::success(user))
        })
        .await
    }

    /// Unknown user and wrong password are reported identically.
    pub async fn verify_login(&self, username: &str, password: &str) -> Outcome<User> {
        guard("verify_login", async {
            let Some(user) = self.store.user_by_username(username).await? else {
                return Ok(Outcome::unauthorized(Message::InvalidCredentials));
            };
            if !self.hasher.verify(password, &user.password_hash, &user.salt) {
                return Ok(Outcome::unauthorized(Message::InvalidCredentials));
            }
            Ok(Outcome::success(user))
        })
        .await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Outcome<User> {
        guard("get_user_by_id", async {
            Ok(match self.store.user_by_id(id).await? {
                Some(user) => Outcome::success(user),
                None => Outcome::not_found(Message::UserNotFound),
            })
        })
        .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Outcome<User> {
        guard("get_user_by_username", async {
            Ok(match self.store.user_by_username(username).await? {
                Some(user) => Outcome::success(user),
                None => Outcome::not_found(Message::UserNotFound),
            })
        })
        .await
    }

    pub async fn get_all_users(&self) -> Outcome<Vec<User>> {
        guard("get_all_users", async {
            let users = self.store.all_users().await?;
            if users.is_empty() {
                return Ok(Outcome::not_found(Message::UsersNotFound));
            }
            Ok(Outcome::success(users))
        })
        .await
    }

    pub async fn update_user(&self, id: i32, patch: UserPatch) -> Outcome<User> {
        if patch.is_empty() {
            return Outcome::bad_request(Message::AtLeastOneUserFieldRequired);
        }

        guard("update_user", async {
            if self.store.user_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found(Message::UserNotFound));
            }
            if let Some(username) = patch.username.as_deref().and_then(required) {
                if let Some(existing) = self.store.user_by_username(username).await? {
                    if existing.id != id {
                        return Ok(Outcome::conflict(Message::UsernameAlreadyExists));
                    }
                }
            }

            Ok(match self.store.update_user(id, patch).await? {
                Some(user) => {
                    info!(user_id = id, "updated user");
                    Outcome::success(user)
                }
                None => Outcome::not_found(Message::UserNotFound),
            })
        })
        .await
    }

    pub async fn change_password(&self, id: i32, current_password: &str, new_password: &str) -> Outcome {
        guard("change_password", async {
            let Some(user) = self.store.user_by_id(id).await? else {
                return Ok(Outcome::not_found(Message::UserNotFound));
            };
            if new_password.chars().count() < MIN_PASSWORD_LEN {
                return Ok(Outcome::bad_request(Message::PasswordMinimumLength));
            }
            if !self.hasher.verify(current_password, &user.password_hash, &user.salt) {
                return Ok(Outcome::unauthorized(Message::CurrentPasswordIncorrect));
            }
            if self.hasher.verify(new_password, &user.password_hash, &user.salt) {
                return Ok(Outcome::bad_request(Message::NewPasswordMustBeDifferent));
            }

            let Some(hashed) = self.hash(new_password) else {
                return Ok(Outcome::failure(Message::InternalServerError));
            };
            if !self.store.update_password(id, &hashed.hash, &hashed.salt).await? {
                return Ok(Outcome::not_found(Message::UserNotFound));
            }

            info!(user_id = id, "changed password");
            Ok(Outcome::success(()))
        })
        .await
    }

    /// Refused while the user still owns projects.
    pub async fn delete_user(&self, id: i32) -> Outcome {
        guard("delete_user", async {
            if self.store.user_by_id(id).await?.is_none() {
                return Ok(Outcome::not_found(Message::UserNotFound));
            }
            if !self.store.projects_by_owner(id).await?.is_empty() {
                return Ok(Outcome::bad_request(Message::CannotDeleteUserWithProjects));
            }
            if !self.store.delete_user(id).await? {
                return Ok(Outcome::not_found(Message::UserNotFound));
            }

            info!(user_id = id, "deleted user");
            Ok(Outcome::success(()))
        })
        .await
    }

    fn hash(&self, password: &str) -> Option<HashedPassword> {
        match self.hasher.hash(password) {
            Ok(hashed) => Some(hashed),
            Err(e) => {
                error!(error = %e, "password hashing failed");
                None
            }
        }
    }
}
