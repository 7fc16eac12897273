use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registered account. The password is stored as a base64 argon2 digest plus
/// the base64 salt it was derived with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub salt: String,
}
