//! Process-wide resolution of the pending login redirect.
//!
//! When the identity provider sends the browser back, the client holds a
//! pending redirect response that must be consumed exactly once, or the
//! client keeps the redirect marked as in progress. [`RedirectResolution`]
//! owns that consumption: it is created with the controller, the host
//! drives it at startup via [`RedirectResolution::driver`], and the
//! callback handler later awaits the same cached outcome.

use crate::client::IdentityClient;
use crate::error::ClientError;
use admin_sso_core::AuthenticationResult;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

type Outcome = Result<Option<AuthenticationResult>, ClientError>;

/// Cached, single-flight outcome of `handle_redirect_promise`.
#[derive(Clone)]
pub struct RedirectResolution {
    outcome: Shared<BoxFuture<'static, Outcome>>,
}

impl RedirectResolution {
    /// Prepares the resolution for `client`. Nothing runs until the
    /// driver or [`settled`](Self::settled) is first polled.
    #[must_use]
    pub fn new(client: Arc<dyn IdentityClient>) -> Self {
        let outcome = async move { client.handle_redirect_promise().await }
            .boxed()
            .shared();
        Self { outcome }
    }

    /// Waits for the redirect to resolve and returns its cached outcome.
    pub async fn settled(&self) -> Outcome {
        self.outcome.clone().await
    }

    /// Returns true once the outcome is cached.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.outcome.peek().is_some()
    }

    /// Returns a future that resolves the redirect and logs the outcome.
    ///
    /// Spawn it on the host's executor at startup so a pending redirect is
    /// consumed even if no callback route is ever rendered.
    pub fn driver(&self) -> impl Future<Output = ()> + Send + 'static {
        let outcome = self.outcome.clone();
        async move {
            match outcome.await {
                Ok(Some(result)) => {
                    info!(
                        has_account = result.account().is_some(),
                        "pending login redirect resolved"
                    );
                }
                Ok(None) => debug!("no pending login redirect"),
                Err(error) => warn!(%error, "resolving login redirect failed"),
            }
        }
    }
}

impl std::fmt::Debug for RedirectResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectResolution")
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedClient;
    use admin_sso_core::Account;

    #[tokio::test]
    async fn driver_and_settled_share_one_resolution() {
        let client = Arc::new(ScriptedClient::new().with_redirect_account(Account::new("u1", "alice")));
        let resolution = RedirectResolution::new(client.clone());

        assert!(!resolution.is_settled());
        resolution.driver().await;
        assert!(resolution.is_settled());

        let outcome = resolution.settled().await.expect("resolved");
        let account = outcome.and_then(AuthenticationResult::into_account);
        assert_eq!(account, Some(Account::new("u1", "alice")));
        assert_eq!(client.redirect_calls(), 1);
    }

    #[tokio::test]
    async fn nothing_runs_until_polled() {
        let client = Arc::new(ScriptedClient::new());
        let _resolution = RedirectResolution::new(client.clone());

        assert_eq!(client.redirect_calls(), 0);
    }

    #[tokio::test]
    async fn failures_are_cached() {
        let client = Arc::new(ScriptedClient::new().with_redirect_error(ClientError::Provider {
            code: "invalid_grant".to_string(),
            details: "code expired".to_string(),
        }));
        let resolution = RedirectResolution::new(client.clone());

        assert!(resolution.settled().await.is_err());
        assert!(resolution.settled().await.is_err());
        assert_eq!(client.redirect_calls(), 1);
    }

    #[tokio::test]
    async fn driver_can_be_spawned() {
        let client = Arc::new(ScriptedClient::new());
        let resolution = RedirectResolution::new(client.clone());

        tokio::spawn(resolution.driver()).await.expect("driver task");

        assert!(resolution.is_settled());
        assert_eq!(client.redirect_calls(), 1);
    }
}
