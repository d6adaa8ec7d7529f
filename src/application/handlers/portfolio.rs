use axum::{extract::State, Json};

use crate::application::errors::ApiError;
use crate::application::state::AppState;
use crate::auth::AuthenticatedUser;
use crate::domain::entities::holding::Holding;
use crate::domain::entities::position::Position;

/// `GET /allholdings`
pub async fn all_holdings(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<Holding>>, ApiError> {
    let holdings = state
        .ledger
        .all_holdings()
        .await
        .map_err(|e| ApiError::persistence("Error fetching holdings", e))?;

    tracing::debug!(identity = %identity, count = holdings.len(), "Listed holdings");
    Ok(Json(holdings))
}

/// `GET /allPositions`
pub async fn all_positions(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<Position>>, ApiError> {
    let positions = state
        .ledger
        .all_positions()
        .await
        .map_err(|e| ApiError::persistence("Error fetching positions", e))?;

    tracing::debug!(identity = %identity, count = positions.len(), "Listed positions");
    Ok(Json(positions))
}
