//! Outcome model returned by every service operation.
//!
//! Expected business failures are values, never panics or `Err`s. Each failure
//! carries an [`ErrorKind`] whose only job is to pick a transport status code.

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;

use crate::messages::{Entity, Message};

/// Failure classification. `None` is only ever reported by successful outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    None,
    NotFound,
    BadRequest,
    Unauthorized,
    Conflict,
    Error,
}

impl ErrorKind {
    /// Transport status for a failure of this kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Error | ErrorKind::None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The failed half of an [`Outcome`]: a kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: ErrorKind,
    message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Success-or-failure carrier. `Outcome<()>` is the data-less form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T = ()> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Outcome::Success(data)
    }

    /// Failure of kind [`ErrorKind::Error`].
    pub fn failure(message: impl Into<String>) -> Self {
        Self::failure_with_kind(message, ErrorKind::Error)
    }

    pub fn failure_with_kind(message: impl Into<String>, kind: ErrorKind) -> Self {
        Outcome::Failure(Failure::new(message, kind))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::failure_with_kind(message, ErrorKind::NotFound)
    }

    /// "Could not find {entity}." or, when `plural`, "No {entities} found."
    pub fn not_found_entity(entity: Entity, plural: bool) -> Self {
        let message = if plural {
            Message::NotFoundPlural(entity)
        } else {
            Message::NotFound(entity)
        };
        Self::not_found(message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::failure_with_kind(message, ErrorKind::BadRequest)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::failure_with_kind(message, ErrorKind::Unauthorized)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::failure_with_kind(message, ErrorKind::Conflict)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Outcome::Success(_) => ErrorKind::None,
            Outcome::Failure(failure) => failure.kind,
        }
    }

    /// Empty for successful outcomes.
    pub fn error_message(&self) -> &str {
        match self {
            Outcome::Success(_) => "",
            Outcome::Failure(failure) => &failure.message,
        }
    }

    /// Status code of a failed outcome.
    ///
    /// # Panics
    ///
    /// Panics when called on a successful outcome; callers branch on success
    /// before translating.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Outcome::Success(_) => {
                panic!("status_code() is only defined for failed outcomes; handle success before translating")
            }
            Outcome::Failure(failure) => failure.status_code(),
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Success(data) => Ok(data),
            Outcome::Failure(failure) => Err(failure),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(data) => Outcome::Success(f(data)),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Outcome::Failure(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_error() {
        let outcome = Outcome::success(42);
        assert!(outcome.is_success());
        assert_eq!(outcome.data(), Some(&42));
        assert_eq!(outcome.error_kind(), ErrorKind::None);
        assert_eq!(outcome.error_message(), "");
    }

    #[test]
    fn failure_defaults_to_error_kind() {
        let outcome: Outcome<u32> = Outcome::failure("boom");
        assert!(!outcome.is_success());
        assert_eq!(outcome.data(), None);
        assert_eq!(outcome.error_kind(), ErrorKind::Error);
        assert_eq!(outcome.error_message(), "boom");
    }

    #[test]
    fn not_found_entity_formats_message() {
        let single: Outcome = Outcome::not_found_entity(Entity::Project, false);
        assert_eq!(single.error_message(), "Could not find Project.");

        let plural: Outcome = Outcome::not_found_entity(Entity::WorkItem, true);
        assert_eq!(plural.error_message(), "No Work items found.");
        assert_eq!(plural.error_kind(), ErrorKind::NotFound);
    }

    #[test]
    fn status_mapping_is_exhaustive() {
        let cases: [(Outcome, StatusCode); 5] = [
            (Outcome::not_found("x"), StatusCode::NOT_FOUND),
            (Outcome::bad_request("x"), StatusCode::BAD_REQUEST),
            (Outcome::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (Outcome::conflict("x"), StatusCode::CONFLICT),
            (Outcome::failure("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (outcome, status) in cases {
            assert_eq!(outcome.status_code(), status);
        }
    }

    #[test]
    #[should_panic(expected = "only defined for failed outcomes")]
    fn status_code_on_success_panics() {
        let outcome = Outcome::success(());
        let _ = outcome.status_code();
    }

    #[test]
    fn map_preserves_failure() {
        let outcome: Outcome<i32> = Outcome::conflict("taken");
        let mapped = outcome.map(|n| n * 2);
        assert_eq!(mapped.error_kind(), ErrorKind::Conflict);
        assert_eq!(mapped.error_message(), "taken");
    }
}
