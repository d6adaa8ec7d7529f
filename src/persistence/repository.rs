//! Database Repository
//!
//! SQLite implementation of [`LedgerStore`] and [`CredentialStore`].

use super::models::*;
use super::DbPool;
use crate::domain::entities::holding::Holding;
use crate::domain::entities::identity::Identity;
use crate::domain::entities::order::{NewOrder, Order};
use crate::domain::entities::position::Position;
use crate::domain::entities::user::{NewUser, User, UserCredentials};
use crate::domain::repositories::ledger_store::{
    CredentialStore, LedgerStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

fn map_sqlx_error(context: &str, e: sqlx::Error) -> StoreError {
    error!("{}: {}", context, e);
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{}: {}", context, db.message()))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{}: {}", context, e))
        }
        _ => StoreError::Query(format!("{}: {}", context, e)),
    }
}

/// Ledger and credential store backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a holding
    pub async fn create_holding(&self, holding: CreateHolding) -> StoreResult<Holding> {
        let record = sqlx::query_as::<_, HoldingRecord>(
            r#"
            INSERT INTO holdings (name, qty, avg, price, net, day)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(&holding.name)
        .bind(holding.qty)
        .bind(holding.avg)
        .bind(holding.price)
        .bind(&holding.net)
        .bind(&holding.day)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create holding", e))?;

        debug!("Created holding: {} ({})", record.id, record.name);
        Ok(record.into())
    }

    /// Insert a position
    pub async fn create_position(&self, position: CreatePosition) -> StoreResult<Position> {
        let record = sqlx::query_as::<_, PositionRecord>(
            r#"
            INSERT INTO positions (product, name, qty, avg, price, net, day, is_loss)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(&position.product)
        .bind(&position.name)
        .bind(position.qty)
        .bind(position.avg)
        .bind(position.price)
        .bind(&position.net)
        .bind(&position.day)
        .bind(position.is_loss)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create position", e))?;

        debug!("Created position: {} ({})", record.id, record.name);
        Ok(record.into())
    }

    /// Read one order back by id.
    ///
    /// Store-level lookup for audits and integration checks; no HTTP route
    /// exposes it.
    pub async fn get_order(&self, id: &str) -> StoreResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to get order", e))?;

        record
            .map(Order::try_from)
            .transpose()
            .map_err(StoreError::Query)
    }

    /// Insert a small sample portfolio when both holdings and positions are empty.
    ///
    /// Returns `true` if rows were inserted.
    pub async fn seed_sample_portfolio(&self) -> StoreResult<bool> {
        let (holdings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM holdings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to count holdings", e))?;
        let (positions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM positions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to count positions", e))?;

        if holdings > 0 || positions > 0 {
            debug!("Skipping sample seed: store already has data");
            return Ok(false);
        }

        let sample_holdings = [
            ("BHARTIARTL", 2.0, 538.05, 541.15, "+0.58%", "+2.99%"),
            ("HDFCBANK", 2.0, 1383.4, 1522.35, "+10.04%", "+0.11%"),
            ("INFY", 1.0, 1350.5, 1555.45, "+15.18%", "-1.60%"),
            ("TCS", 1.0, 3041.7, 3194.8, "+5.03%", "-0.25%"),
        ];
        for (name, qty, avg, price, net, day) in sample_holdings {
            self.create_holding(CreateHolding {
                name: name.to_string(),
                qty,
                avg,
                price,
                net: net.to_string(),
                day: day.to_string(),
            })
            .await?;
        }

        let sample_positions = [
            ("CNC", "EVEREADY", 2.0, 316.27, 312.35, "+0.58%", "-1.24%", true),
            ("CNC", "JUBLFOOD", 1.0, 3124.75, 3082.65, "+10.04%", "-1.35%", true),
        ];
        for (product, name, qty, avg, price, net, day, is_loss) in sample_positions {
            self.create_position(CreatePosition {
                product: product.to_string(),
                name: name.to_string(),
                qty,
                avg,
                price,
                net: net.to_string(),
                day: day.to_string(),
                is_loss,
            })
            .await?;
        }

        info!(
            "✓ Seeded {} holdings and {} positions",
            sample_holdings.len(),
            sample_positions.len()
        );
        Ok(true)
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn all_holdings(&self) -> StoreResult<Vec<Holding>> {
        let records = sqlx::query_as::<_, HoldingRecord>("SELECT * FROM holdings ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to get holdings", e))?;

        Ok(records.into_iter().map(Holding::from).collect())
    }

    async fn all_positions(&self) -> StoreResult<Vec<Position>> {
        let records = sqlx::query_as::<_, PositionRecord>("SELECT * FROM positions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to get positions", e))?;

        Ok(records.into_iter().map(Position::from).collect())
    }

    async fn create_order(&self, order: NewOrder, placed_by: &Identity) -> StoreResult<Order> {
        let id = Uuid::new_v4().to_string();
        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            INSERT INTO orders (id, name, qty, price, mode, placed_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&order.name)
        .bind(order.qty)
        .bind(order.price)
        .bind(order.mode.as_str())
        .bind(placed_by.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create order", e))?;

        debug!("Created order: {} ({} {})", record.id, record.mode, record.name);
        Order::try_from(record).map_err(StoreError::Query)
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let id = Uuid::new_v4().to_string();
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create user", e))?;

        debug!("Created user: {}", record.id);
        Ok(UserCredentials::from(record).user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to look up user by email", e))?;

        Ok(record.map(UserCredentials::from))
    }

    async fn find_by_id(&self, id: &Identity) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to look up user by id", e))?;

        Ok(record.map(|r| UserCredentials::from(r).user))
    }
}
