use serde::{Deserialize, Serialize};

/// A long-term holding in the portfolio.
///
/// `net` and `day` are display-formatted percentage changes (e.g. `"+0.58%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: i64,
    pub name: String,
    pub qty: f64,
    pub avg: f64,
    pub price: f64,
    pub net: String,
    pub day: String,
}
