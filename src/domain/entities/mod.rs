pub mod holding;
pub mod identity;
pub mod order;
pub mod position;
pub mod user;
