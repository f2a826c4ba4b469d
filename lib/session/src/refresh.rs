//! Best-effort token refresh.
//!
//! [`TokenRefresher::refresh`] keeps a session warm: it silently asks the
//! identity client for a token on behalf of the current account, letting
//! the client renew it if needed. An absent account or token is not an
//! error here; only client faults propagate.

use crate::client::{AccountLookup, IdentityClient, acquire_silently, resolve_account};
use crate::error::AuthError;
use crate::gate::InitializationGate;
use admin_sso_core::TokenRequest;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The client the refresher works with: ready, or awaiting its handshake.
#[derive(Clone)]
enum ClientHandle {
    Ready(Arc<dyn IdentityClient>),
    Gated {
        client: Arc<dyn IdentityClient>,
        gate: InitializationGate,
    },
}

impl ClientHandle {
    async fn resolve(&self) -> Result<Arc<dyn IdentityClient>, Report<AuthError>> {
        match self {
            Self::Ready(client) => Ok(Arc::clone(client)),
            Self::Gated { client, gate } => gate.initialize(Arc::clone(client)).await,
        }
    }
}

/// Silently revalidates the current account's token.
#[derive(Clone)]
pub struct TokenRefresher {
    client: ClientHandle,
    token_request: TokenRequest,
}

impl TokenRefresher {
    /// Creates a refresher for an initialized client.
    #[must_use]
    pub fn new(client: Arc<dyn IdentityClient>, token_request: TokenRequest) -> Self {
        Self {
            client: ClientHandle::Ready(client),
            token_request,
        }
    }

    /// Creates a refresher that passes `client` through `gate` before
    /// every refresh.
    #[must_use]
    pub fn after_initialization(
        client: Arc<dyn IdentityClient>,
        gate: InitializationGate,
        token_request: TokenRequest,
    ) -> Self {
        Self {
            client: ClientHandle::Gated { client, gate },
            token_request,
        }
    }

    /// Returns the token request used for refreshes.
    #[must_use]
    pub fn token_request(&self) -> &TokenRequest {
        &self.token_request
    }

    /// Refreshes the token of the active (or first cached) account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Initialization`] if the gated client failed to
    /// start and [`AuthError::Client`] if the client faulted.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), Report<AuthError>> {
        let client = self.client.resolve().await?;
        let Some(account) = resolve_account(client.as_ref(), AccountLookup::ActiveOrFirstCached)
        else {
            debug!("no account to refresh");
            return Ok(());
        };

        let token = acquire_silently(client.as_ref(), &account, &self.token_request)
            .await
            .map_err(|e| AuthError::client("refresh", &e))?;

        if token.is_some() {
            debug!(account = %account.local_account_id(), "token refreshed");
        } else {
            debug!(account = %account.local_account_id(), "no token available silently");
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRefresher")
            .field("token_request", &self.token_request)
            .finish_non_exhaustive()
    }
}
