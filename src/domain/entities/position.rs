use serde::{Deserialize, Serialize};

/// An intraday or carry-forward position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: i64,
    /// Product type, e.g. `CNC` or `MIS`
    pub product: String,
    pub name: String,
    pub qty: f64,
    pub avg: f64,
    pub price: f64,
    pub net: String,
    pub day: String,
    pub is_loss: bool,
}
