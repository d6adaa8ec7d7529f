use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::identity::Identity;

/// Public view of a registered user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Identity,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored argon2 hash, as read from the credential store.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Input for registering a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
