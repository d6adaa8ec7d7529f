use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    Buy,
    Sell,
}

impl OrderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderMode::Buy => "buy",
            OrderMode::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OrderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(OrderMode::Buy),
            "sell" => Ok(OrderMode::Sell),
            other => Err(format!("Invalid mode '{}'. Must be 'buy' or 'sell'", other)),
        }
    }
}

/// Raw `POST /newOrder` body.
///
/// Every field is optional so that an incomplete body is reported as a
/// validation failure naming the field instead of a generic decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRequest {
    pub name: Option<String>,
    pub qty: Option<f64>,
    pub price: Option<f64>,
    pub mode: Option<String>,
}

/// An order that passed validation and can be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub name: String,
    pub qty: f64,
    pub price: f64,
    pub mode: OrderMode,
}

impl NewOrder {
    pub fn new(name: impl Into<String>, qty: f64, price: f64, mode: OrderMode) -> Result<Self, String> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err("Order name must not be empty".to_string());
        }
        if !qty.is_finite() || qty <= 0.0 {
            return Err("Order qty must be a positive number".to_string());
        }
        if !price.is_finite() || price <= 0.0 {
            return Err("Order price must be a positive number".to_string());
        }

        Ok(NewOrder {
            name,
            qty,
            price,
            mode,
        })
    }
}

impl TryFrom<OrderRequest> for NewOrder {
    type Error = String;

    fn try_from(request: OrderRequest) -> Result<Self, Self::Error> {
        let name = request.name.ok_or("Missing name field")?;
        let qty = request.qty.ok_or("Missing qty field")?;
        let price = request.price.ok_or("Missing price field")?;
        let mode = request.mode.ok_or("Missing mode field")?.parse::<OrderMode>()?;

        NewOrder::new(name, qty, price, mode)
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub name: String,
    pub qty: f64,
    pub price: f64,
    pub mode: OrderMode,
    pub placed_by: Identity,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, qty: f64, price: f64, mode: &str) -> OrderRequest {
        OrderRequest {
            name: Some(name.to_string()),
            qty: Some(qty),
            price: Some(price),
            mode: Some(mode.to_string()),
        }
    }

    #[test]
    fn test_valid_buy_order() {
        let order = NewOrder::try_from(request("INFY", 10.0, 1500.0, "buy")).unwrap();
        assert_eq!(order.name, "INFY");
        assert_eq!(order.qty, 10.0);
        assert_eq!(order.price, 1500.0);
        assert_eq!(order.mode, OrderMode::Buy);
    }

    #[test]
    fn test_mode_is_case_insensitive() {
        let order = NewOrder::try_from(request("TCS", 1.0, 3000.0, "SELL")).unwrap();
        assert_eq!(order.mode, OrderMode::Sell);
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut req = request("INFY", 10.0, 1500.0, "buy");
        req.price = None;
        let err = NewOrder::try_from(req).unwrap_err();
        assert_eq!(err, "Missing price field");
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = NewOrder::try_from(request("INFY", 10.0, 1500.0, "hold")).unwrap_err();
        assert!(err.contains("Invalid mode"));
    }

    #[test]
    fn test_rejects_non_positive_values() {
        assert!(NewOrder::new("INFY", 0.0, 1500.0, OrderMode::Buy).is_err());
        assert!(NewOrder::new("INFY", 10.0, -1.0, OrderMode::Buy).is_err());
        assert!(NewOrder::new("INFY", f64::NAN, 1500.0, OrderMode::Buy).is_err());
        assert!(NewOrder::new("   ", 10.0, 1500.0, OrderMode::Buy).is_err());
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OrderMode::Buy).unwrap(), "\"buy\"");
    }
}
