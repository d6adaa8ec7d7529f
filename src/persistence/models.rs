//! Database Models
//!
//! Row types for the ledger tables and their conversion into domain entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::holding::Holding;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::order::{Order, OrderMode};
use crate::domain::entities::position::Position;
use crate::domain::entities::user::{User, UserCredentials};

/// Holding record in database
#[derive(Debug, Clone, FromRow)]
pub struct HoldingRecord {
    pub id: i64,
    pub name: String,
    pub qty: f64,
    pub avg: f64,
    pub price: f64,
    pub net: String,
    pub day: String,
}

impl From<HoldingRecord> for Holding {
    fn from(r: HoldingRecord) -> Self {
        Holding {
            id: r.id,
            name: r.name,
            qty: r.qty,
            avg: r.avg,
            price: r.price,
            net: r.net,
            day: r.day,
        }
    }
}

/// Position record in database
#[derive(Debug, Clone, FromRow)]
pub struct PositionRecord {
    pub id: i64,
    pub product: String,
    pub name: String,
    pub qty: f64,
    pub avg: f64,
    pub price: f64,
    pub net: String,
    pub day: String,
    pub is_loss: bool,
}

impl From<PositionRecord> for Position {
    fn from(r: PositionRecord) -> Self {
        Position {
            id: r.id,
            product: r.product,
            name: r.name,
            qty: r.qty,
            avg: r.avg,
            price: r.price,
            net: r.net,
            day: r.day,
            is_loss: r.is_loss,
        }
    }
}

/// Order record in database
#[derive(Debug, Clone, FromRow)]
pub struct OrderRecord {
    pub id: String,
    pub name: String,
    pub qty: f64,
    pub price: f64,
    pub mode: String, // "buy" or "sell"
    pub placed_by: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = String;

    fn try_from(r: OrderRecord) -> Result<Self, Self::Error> {
        Ok(Order {
            id: r.id,
            name: r.name,
            qty: r.qty,
            price: r.price,
            mode: r.mode.parse::<OrderMode>()?,
            placed_by: Identity::new(r.placed_by),
            created_at: r.created_at,
        })
    }
}

/// User record in database
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserCredentials {
    fn from(r: UserRecord) -> Self {
        UserCredentials {
            user: User {
                id: Identity::new(r.id),
                username: r.username,
                email: r.email,
                created_at: r.created_at,
            },
            password_hash: r.password_hash,
        }
    }
}

/// Create holding input
#[derive(Debug, Clone)]
pub struct CreateHolding {
    pub name: String,
    pub qty: f64,
    pub avg: f64,
    pub price: f64,
    pub net: String,
    pub day: String,
}

/// Create position input
#[derive(Debug, Clone)]
pub struct CreatePosition {
    pub product: String,
    pub name: String,
    pub qty: f64,
    pub avg: f64,
    pub price: f64,
    pub net: String,
    pub day: String,
    pub is_loss: bool,
}
