//! Request shapes handed to the identity client.
//!
//! `RedirectRequest` and `TokenRequest` are configuration: they are
//! deserialized once and reused for every ceremony. `SilentRequest` and
//! `EndSessionRequest` are built per call and always name an account.

use crate::account::Account;
use serde::{Deserialize, Serialize};

/// Scope requested when the host does not configure any.
pub const DEFAULT_SCOPE: &str = "User.Read";

fn default_scopes() -> Vec<String> {
    vec![DEFAULT_SCOPE.to_string()]
}

/// Parameters of a redirect-based login ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRequest {
    /// Scopes the user consents to during sign-in.
    /// Default: `["User.Read"]`
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Interaction hint forwarded to the provider (`login`, `select_account`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Pre-fills the provider's username field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
}

impl Default for RedirectRequest {
    fn default() -> Self {
        Self {
            scopes: default_scopes(),
            prompt: None,
            login_hint: None,
        }
    }
}

/// Parameters of silent token acquisition, independent of any account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Scopes the access token must carry.
    /// Default: `["User.Read"]`
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Skip the client's token cache and go to the provider.
    /// Default: `false`
    #[serde(default)]
    pub force_refresh: bool,
}

impl Default for TokenRequest {
    fn default() -> Self {
        Self {
            scopes: default_scopes(),
            force_refresh: false,
        }
    }
}

impl TokenRequest {
    /// Binds this request to an account.
    #[must_use]
    pub fn for_account(&self, account: Account) -> SilentRequest {
        SilentRequest {
            account,
            scopes: self.scopes.clone(),
            force_refresh: self.force_refresh,
        }
    }
}

/// A silent token request scoped to one account.
#[derive(Debug, Clone, PartialEq)]
pub struct SilentRequest {
    /// The account the token is requested for.
    pub account: Account,
    /// Scopes the access token must carry.
    pub scopes: Vec<String>,
    /// Skip the client's token cache.
    pub force_refresh: bool,
}

/// Parameters of a redirect-based logout ceremony.
#[derive(Debug, Clone, PartialEq)]
pub struct EndSessionRequest {
    /// The account being signed out.
    pub account: Account,
    /// Where the provider sends the browser after sign-out.
    pub post_logout_redirect_uri: Option<String>,
}

impl EndSessionRequest {
    /// Creates a logout request for an account.
    #[must_use]
    pub fn new(account: Account) -> Self {
        Self {
            account,
            post_logout_redirect_uri: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_request_user_read() {
        assert_eq!(RedirectRequest::default().scopes, vec!["User.Read"]);

        let token = TokenRequest::default();
        assert_eq!(token.scopes, vec!["User.Read"]);
        assert!(!token.force_refresh);
    }

    #[test]
    fn token_request_deserializes_with_defaults() {
        let request: TokenRequest = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(request, TokenRequest::default());

        let request: TokenRequest =
            serde_json::from_str(r#"{"scopes": ["api://admin/.default"], "force_refresh": true}"#)
                .expect("deserialize");
        assert_eq!(request.scopes, vec!["api://admin/.default"]);
        assert!(request.force_refresh);
    }

    #[test]
    fn for_account_copies_scope_configuration() {
        let request = TokenRequest {
            scopes: vec!["Files.Read".to_string()],
            force_refresh: true,
        };
        let account = Account::new("u1", "alice");

        let silent = request.for_account(account.clone());

        assert_eq!(silent.account, account);
        assert_eq!(silent.scopes, vec!["Files.Read"]);
        assert!(silent.force_refresh);
    }
}
