//! Resource services: input validation and orchestration over the store.
//!
//! Services never decide who may call them; handlers consult
//! [`crate::auth::AuthorizationService`] first.

pub mod project_service;
pub mod sprint_service;
pub mod tag_service;
pub mod user_service;
pub mod work_item_service;

use std::future::Future;

use tracing::{error, warn};

use crate::database::StoreError;
use crate::messages::Message;
use crate::outcome::Outcome;

pub use project_service::ProjectService;
pub use sprint_service::SprintService;
pub use tag_service::TagService;
pub use user_service::UserService;
pub use work_item_service::WorkItemService;

/// Runs a service body and turns store faults into outcomes.
///
/// A unique-constraint violation becomes `Conflict`; anything else is logged
/// and reported as the generic internal error, never the raw cause.
pub(crate) async fn guard<T, F>(operation: &'static str, body: F) -> Outcome<T>
where
    F: Future<Output = Result<Outcome<T>, StoreError>>,
{
    match body.await {
        Ok(outcome) => outcome,
        Err(StoreError::UniqueViolation(detail)) => {
            warn!(operation, %detail, "unique constraint rejected write");
            Outcome::conflict(Message::DuplicateValue)
        }
        Err(err) => {
            error!(operation, error = %err, "persistence failure");
            Outcome::failure(Message::InternalServerError)
        }
    }
}

/// Trimmed value when present and not blank.
pub(crate) fn required(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
