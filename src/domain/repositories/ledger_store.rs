//! Store Traits
//!
//! The HTTP layer talks to persistence only through these traits, so handlers
//! can be exercised against an in-memory store and the SQLite backend can be
//! swapped without touching the auth path.

use crate::domain::entities::holding::Holding;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::order::{NewOrder, Order};
use crate::domain::entities::position::Position;
use crate::domain::entities::user::{NewUser, User, UserCredentials};
use async_trait::async_trait;

/// Common result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a store backend
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or the pool is closed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other query or decoding failure
    #[error("Query failed: {0}")]
    Query(String),
}

/// Portfolio records and order submissions
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// List every holding
    async fn all_holdings(&self) -> StoreResult<Vec<Holding>>;

    /// List every position
    async fn all_positions(&self) -> StoreResult<Vec<Position>>;

    /// Persist a validated order on behalf of `placed_by`
    async fn create_order(&self, order: NewOrder, placed_by: &Identity) -> StoreResult<Order>;
}

/// User records and password hashes
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user; fails with [`StoreError::Conflict`] if the email or username is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>>;

    async fn find_by_id(&self, id: &Identity) -> StoreResult<Option<User>>;
}
