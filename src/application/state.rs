use std::sync::Arc;

use crate::auth::{AuthState, TokenService};
use crate::domain::repositories::ledger_store::{CredentialStore, LedgerStore};

/// Shared state handed to every handler.
///
/// Everything here is either immutable (`tokens`) or manages its own
/// concurrency (the stores' connection pools).
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            ledger,
            credentials,
            tokens,
        }
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState::new(self.tokens.clone())
    }
}
