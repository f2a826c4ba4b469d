//! Request authorizer.
//!
//! Wraps the data layer's HTTP calls: before each request it resolves the
//! active account, silently acquires a token, and hands the transport an
//! [`AuthorizationContext`]. Nothing is cached here; every request asks the
//! identity client, which owns the token cache.

use crate::client::{AccountLookup, IdentityClient, acquire_silently, resolve_account};
use crate::error::{AuthError, ClientError, HttpError};
use crate::transport::{HttpTransport, JsonResponse, ReqwestTransport, RequestOptions};
use admin_sso_core::TokenRequest;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Credentials attached to one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    authenticated: bool,
    token: String,
}

impl AuthorizationContext {
    /// Builds the context for an access token, or for its absence.
    ///
    /// Without a token the bearer value reads `Bearer undefined` and the
    /// context is unauthenticated, so transports leave the header off.
    #[must_use]
    pub fn from_token(access_token: Option<&str>) -> Self {
        Self {
            authenticated: access_token.is_some(),
            token: format!("Bearer {}", access_token.unwrap_or("undefined")),
        }
    }

    /// Returns true if a token was obtained.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns the bearer-scheme value, authenticated or not.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the `Authorization` header value to send, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<&str> {
        self.authenticated.then_some(self.token.as_str())
    }
}

/// Attaches bearer tokens to the data layer's HTTP requests.
pub struct RequestAuthorizer<T = ReqwestTransport> {
    client: Arc<dyn IdentityClient>,
    token_request: TokenRequest,
    transport: T,
}

impl RequestAuthorizer<ReqwestTransport> {
    /// Creates an authorizer sending through a default `reqwest` client.
    #[must_use]
    pub fn new(client: Arc<dyn IdentityClient>, token_request: TokenRequest) -> Self {
        Self::with_transport(client, token_request, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> RequestAuthorizer<T> {
    /// Creates an authorizer sending through `transport`.
    #[must_use]
    pub fn with_transport(
        client: Arc<dyn IdentityClient>,
        token_request: TokenRequest,
        transport: T,
    ) -> Self {
        Self {
            client,
            token_request,
            transport,
        }
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn acquire_context(&self) -> Result<AuthorizationContext, ClientError> {
        let Some(account) = resolve_account(self.client.as_ref(), AccountLookup::ActiveOnly) else {
            debug!("no active account, request goes out unauthenticated");
            return Ok(AuthorizationContext::from_token(None));
        };
        let token = acquire_silently(self.client.as_ref(), &account, &self.token_request).await?;
        Ok(AuthorizationContext::from_token(
            token.as_ref().and_then(|result| result.access_token()),
        ))
    }

    /// Builds the authorization context for the next request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Client`] if the identity client faulted.
    pub async fn authorization(&self) -> Result<AuthorizationContext, Report<AuthError>> {
        self.acquire_context()
            .await
            .map_err(|e| AuthError::client("authorize_request", &e).into())
    }

    /// Sends an authorized JSON request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Authorization`] if no context could be built,
    /// and whatever the transport reports otherwise.
    #[instrument(skip(self, options))]
    pub async fn fetch_json(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<JsonResponse, Report<HttpError>> {
        let authorization = self
            .acquire_context()
            .await
            .map_err(|e| HttpError::Authorization {
                details: e.to_string(),
            })?;
        debug!(
            authenticated = authorization.is_authenticated(),
            "request authorized"
        );
        self.transport
            .fetch_json(url, options, &authorization)
            .await
    }
}

impl<T> std::fmt::Debug for RequestAuthorizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthorizer")
            .field("token_request", &self.token_request)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedClient;
    use admin_sso_core::Account;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the context of every request and answers 200.
    #[derive(Default)]
    struct RecordingTransport {
        seen: Mutex<Vec<(String, AuthorizationContext)>>,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn fetch_json(
            &self,
            url: &str,
            _options: RequestOptions,
            authorization: &AuthorizationContext,
        ) -> Result<JsonResponse, Report<HttpError>> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), authorization.clone()));
            Ok(JsonResponse {
                status: 200,
                headers: Default::default(),
                body: "[]".to_string(),
                json: Some(serde_json::json!([])),
            })
        }
    }

    fn authorizer(client: Arc<ScriptedClient>) -> RequestAuthorizer<RecordingTransport> {
        RequestAuthorizer::with_transport(
            client,
            TokenRequest::default(),
            RecordingTransport::default(),
        )
    }

    #[test]
    fn context_with_token() {
        let context = AuthorizationContext::from_token(Some("abc123"));
        assert!(context.is_authenticated());
        assert_eq!(context.token(), "Bearer abc123");
        assert_eq!(context.header_value(), Some("Bearer abc123"));
    }

    #[test]
    fn context_without_token() {
        let context = AuthorizationContext::from_token(None);
        assert!(!context.is_authenticated());
        assert_eq!(context.token(), "Bearer undefined");
        assert_eq!(context.header_value(), None);
    }

    #[tokio::test]
    async fn attaches_token_of_active_account() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_active_account(Account::new("u1", "alice"))
                .with_token("abc123"),
        );
        let authorizer = authorizer(client.clone());

        let response = authorizer
            .fetch_json("https://api.example/posts", RequestOptions::default())
            .await
            .expect("response");

        assert_eq!(response.status, 200);
        let seen = authorizer.transport().seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "https://api.example/posts");
        assert_eq!(seen[0].1.token(), "Bearer abc123");
        assert!(seen[0].1.is_authenticated());
    }

    #[tokio::test]
    async fn every_request_asks_for_a_token() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_active_account(Account::new("u1", "alice"))
                .with_token("abc123"),
        );
        let authorizer = authorizer(client.clone());

        for _ in 0..3 {
            authorizer
                .fetch_json("https://api.example/posts", RequestOptions::default())
                .await
                .expect("response");
        }

        assert_eq!(client.token_requests().len(), 3);
    }

    #[tokio::test]
    async fn no_active_account_is_unauthenticated() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_cached_accounts(vec![Account::new("cached", "bob")])
                .with_token("abc123"),
        );
        let authorizer = authorizer(client.clone());

        let context = authorizer.authorization().await.expect("context");

        assert!(!context.is_authenticated());
        assert!(client.token_requests().is_empty());
    }

    #[tokio::test]
    async fn no_token_is_unauthenticated() {
        let client = Arc::new(ScriptedClient::new().with_active_account(Account::new("u1", "alice")));
        let authorizer = authorizer(client.clone());

        let context = authorizer.authorization().await.expect("context");

        assert!(!context.is_authenticated());
        assert_eq!(context.token(), "Bearer undefined");
        assert_eq!(client.token_requests().len(), 1);
    }

    #[tokio::test]
    async fn empty_token_is_unauthenticated() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_active_account(Account::new("u1", "alice"))
                .with_token(""),
        );
        let authorizer = authorizer(client);

        let context = authorizer.authorization().await.expect("context");

        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn client_fault_fails_request() {
        let client = Arc::new(
            ScriptedClient::new()
                .with_active_account(Account::new("u1", "alice"))
                .with_token_error(ClientError::Network {
                    details: "offline".to_string(),
                }),
        );
        let authorizer = authorizer(client);

        let err = authorizer
            .fetch_json("https://api.example/posts", RequestOptions::default())
            .await
            .expect_err("fault");

        assert!(matches!(
            err.current_context(),
            HttpError::Authorization { .. }
        ));
        assert!(authorizer.transport().seen.lock().unwrap().is_empty());
    }
}
