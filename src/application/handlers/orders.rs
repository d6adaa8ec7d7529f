use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use crate::application::errors::ApiError;
use crate::application::state::AppState;
use crate::auth::AuthenticatedUser;
use crate::domain::entities::order::{NewOrder, OrderRequest};

/// `POST /newOrder`
///
/// Validates the body into a [`NewOrder`] before anything touches the store.
pub async fn new_order(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let order = NewOrder::try_from(request).map_err(ApiError::Validation)?;

    let saved = state
        .ledger
        .create_order(order, &identity)
        .await
        .map_err(|e| ApiError::persistence("Error saving order", e))?;

    tracing::info!(
        order_id = %saved.id,
        identity = %identity,
        "✓ Order saved: {} {} x {} @ {}",
        saved.mode,
        saved.name,
        saved.qty,
        saved.price
    );

    Ok(Json(json!({
        "message": "Order saved successfully!",
        "order": saved,
    })))
}
