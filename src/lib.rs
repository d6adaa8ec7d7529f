//! Trade Ledger Backend Library
//!
//! A small portfolio ledger service: bearer-token authentication in front of
//! holdings, positions and order submission backed by SQLite.

pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod persistence;
pub mod rate_limit;
pub mod secrets;
