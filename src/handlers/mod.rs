// handlers/mod.rs - two security tiers
//
// Public (no auth): /api/users/register, /api/users/login
// Protected (bearer token): every other /api/* route
pub mod protected;
pub mod public;

use std::sync::Arc;

use tracing::warn;

use crate::auth::{Argon2PasswordHasher, AuthorizationService, PasswordHasher, TokenService};
use crate::database::Store;
use crate::error::ApiError;
use crate::messages::Message;
use crate::outcome::Outcome;
use crate::services::{ProjectService, SprintService, TagService, UserService, WorkItemService};

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub projects: ProjectService,
    pub sprints: SprintService,
    pub work_items: WorkItemService,
    pub tags: TagService,
    pub authz: AuthorizationService,
    pub tokens: TokenService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self::with_hasher(store, tokens, Arc::new(Argon2PasswordHasher::new()))
    }

    pub fn with_hasher(store: Arc<dyn Store>, tokens: TokenService, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            users: UserService::new(store.clone(), hasher),
            projects: ProjectService::new(store.clone()),
            sprints: SprintService::new(store.clone()),
            work_items: WorkItemService::new(store.clone()),
            tags: TagService::new(store.clone()),
            authz: AuthorizationService::new(store.clone()),
            tokens,
            store,
        }
    }
}

/// Applies an authorization decision.
///
/// A failed check keeps its own status (401/404), `false` becomes 403 with
/// `denial`, `true` lets the handler proceed.
pub(crate) fn authorize(decision: Outcome<bool>, denial: Message) -> Result<(), ApiError> {
    if decision.into_result()? {
        return Ok(());
    }
    warn!(%denial, "authorization denied");
    Err(ApiError::forbidden(denial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn authorize_maps_the_three_outcomes() {
        assert!(authorize(Outcome::success(true), Message::OnlyOwnerCanDelete).is_ok());

        let denied = authorize(Outcome::success(false), Message::OnlyOwnerCanDelete).unwrap_err();
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(denied.message(), "Only the project owner can delete this project.");

        let missing = authorize(Outcome::not_found("Could not find Project."), Message::OnlyOwnerCanDelete).unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let caller = authorize(Outcome::unauthorized("Could not find User."), Message::OnlyOwnerCanDelete).unwrap_err();
        assert_eq!(caller.status_code(), StatusCode::UNAUTHORIZED);
    }
}
