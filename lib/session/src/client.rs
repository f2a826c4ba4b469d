//! Identity client adapter.
//!
//! [`IdentityClient`] is the capability the adapter consumes: an
//! identity-provider client that caches accounts and tokens and runs the
//! redirect ceremonies. The helpers in this module hold the account and
//! token lookups that several components share.

use crate::error::ClientError;
use admin_sso_core::{
    Account, AuthenticationResult, EndSessionRequest, RedirectRequest, SilentRequest, TokenRequest,
};
use async_trait::async_trait;
use tracing::debug;

/// An identity-provider client.
///
/// Implementations wrap a provider library (for example a browser MSAL
/// binding). Account lookups are synchronous reads of the client's cache;
/// everything that may reach the network is async.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Runs the client's one-time startup handshake.
    async fn initialize(&self) -> Result<(), ClientError>;

    /// Returns the account explicitly marked active, if any.
    fn active_account(&self) -> Option<Account>;

    /// Returns every cached account, most recent sign-in first.
    fn all_accounts(&self) -> Vec<Account>;

    /// Marks an account as active, or clears the active account.
    fn set_active_account(&self, account: Option<Account>);

    /// Requests a token without user interaction.
    ///
    /// `Ok(None)` and `Err(ClientError::InteractionRequired)` both mean no
    /// token could be obtained silently.
    async fn acquire_token_silent(
        &self,
        request: SilentRequest,
    ) -> Result<Option<AuthenticationResult>, ClientError>;

    /// Starts a redirect-based login ceremony.
    async fn login_redirect(&self, request: RedirectRequest) -> Result<(), ClientError>;

    /// Starts a redirect-based logout ceremony.
    async fn logout_redirect(&self, request: EndSessionRequest) -> Result<(), ClientError>;

    /// Resolves the response of a pending redirect.
    ///
    /// Must be idempotent: once settled, later calls return the same result.
    async fn handle_redirect_promise(&self) -> Result<Option<AuthenticationResult>, ClientError>;
}

/// Which accounts an operation may fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountLookup {
    /// Only the account marked active.
    ActiveOnly,
    /// The active account, else the first cached account.
    ActiveOrFirstCached,
}

/// Resolves the account an operation works against.
pub fn resolve_account(client: &dyn IdentityClient, lookup: AccountLookup) -> Option<Account> {
    if let Some(account) = client.active_account() {
        return Some(account);
    }
    match lookup {
        AccountLookup::ActiveOnly => None,
        AccountLookup::ActiveOrFirstCached => {
            let account = client.all_accounts().into_iter().next();
            if account.is_some() {
                debug!("no active account, falling back to first cached account");
            }
            account
        }
    }
}

/// Silently acquires a token for `account`, treating "interaction
/// required" as the absence of a token.
pub async fn acquire_silently(
    client: &dyn IdentityClient,
    account: &Account,
    request: &TokenRequest,
) -> Result<Option<AuthenticationResult>, ClientError> {
    match client
        .acquire_token_silent(request.for_account(account.clone()))
        .await
    {
        Ok(result) => Ok(result),
        Err(ClientError::InteractionRequired { reason }) => {
            debug!(%reason, "silent token acquisition needs interaction");
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedClient;

    #[test]
    fn active_account_wins_over_cache() {
        let active = Account::new("active", "alice");
        let client = ScriptedClient::new()
            .with_active_account(active.clone())
            .with_cached_accounts(vec![Account::new("cached", "bob")]);

        assert_eq!(
            resolve_account(&client, AccountLookup::ActiveOrFirstCached),
            Some(active.clone())
        );
        assert_eq!(resolve_account(&client, AccountLookup::ActiveOnly), Some(active));
    }

    #[test]
    fn fallback_only_when_allowed() {
        let cached = Account::new("cached", "bob");
        let client = ScriptedClient::new()
            .with_cached_accounts(vec![cached.clone(), Account::new("other", "carol")]);

        assert_eq!(
            resolve_account(&client, AccountLookup::ActiveOrFirstCached),
            Some(cached)
        );
        assert_eq!(resolve_account(&client, AccountLookup::ActiveOnly), None);
    }

    #[test]
    fn no_accounts_resolves_nothing() {
        let client = ScriptedClient::new();
        assert_eq!(
            resolve_account(&client, AccountLookup::ActiveOrFirstCached),
            None
        );
    }

    #[tokio::test]
    async fn interaction_required_reads_as_no_token() {
        let client = ScriptedClient::new().with_token_error(ClientError::InteractionRequired {
            reason: "login_required".to_string(),
        });
        let account = Account::new("u1", "alice");

        let result = acquire_silently(&client, &account, &TokenRequest::default())
            .await
            .expect("interaction required is not a fault");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn other_client_errors_propagate() {
        let client = ScriptedClient::new().with_token_error(ClientError::Network {
            details: "offline".to_string(),
        });
        let account = Account::new("u1", "alice");

        let err = acquire_silently(&client, &account, &TokenRequest::default())
            .await
            .expect_err("network faults propagate");

        assert!(matches!(err, ClientError::Network { .. }));
    }

    #[tokio::test]
    async fn request_is_scoped_to_account() {
        let client = ScriptedClient::new().with_token("abc123");
        let account = Account::new("u1", "alice");
        let request = TokenRequest {
            scopes: vec!["Files.Read".to_string()],
            force_refresh: true,
        };

        acquire_silently(&client, &account, &request)
            .await
            .expect("token");

        let requests = client.token_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].account, account);
        assert_eq!(requests[0].scopes, vec!["Files.Read"]);
        assert!(requests[0].force_refresh);
    }
}
