//! Authentication
//!
//! Stateless bearer-token authentication for the protected ledger routes:
//!
//! - [`token`] issues and verifies HS256 session tokens
//! - [`middleware`] gates protected routes and attaches the verified identity
//! - [`password`] hashes and checks user passwords with argon2id

mod errors;
pub mod middleware;
pub mod password;
pub mod token;

pub use errors::AuthError;
pub use middleware::{require_auth, AuthState, AuthenticatedUser, NoRevocation, RevocationCheck};
pub use token::{Claims, IssuedToken, SigningError, TokenService};
