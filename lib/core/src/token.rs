//! Results of token acquisition and redirect handling.

use crate::account::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a successful token acquisition or redirect round trip.
///
/// The identity client caches these; the adapter only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    /// Bearer credential; may be empty when only an ID token was issued.
    #[serde(default)]
    access_token: String,
    /// Raw ID token, when one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    /// Scopes actually granted.
    #[serde(default)]
    scopes: Vec<String>,
    /// Account the result belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account: Option<Account>,
    /// When the access token expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_on: Option<DateTime<Utc>>,
}

impl AuthenticationResult {
    /// Creates a result carrying an access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: None,
            scopes: Vec::new(),
            account: None,
            expires_on: None,
        }
    }

    /// Sets the account.
    #[must_use]
    pub fn with_account(mut self, account: Option<Account>) -> Self {
        self.account = account;
        self
    }

    /// Sets the granted scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, id_token: Option<String>) -> Self {
        self.id_token = id_token;
        self
    }

    /// Sets the expiry.
    #[must_use]
    pub fn with_expires_on(mut self, expires_on: Option<DateTime<Utc>>) -> Self {
        self.expires_on = expires_on;
        self
    }

    /// Returns the access token, or `None` when it is empty.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        Some(self.access_token.as_str()).filter(|token| !token.is_empty())
    }

    /// Returns the ID token, if present.
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    /// Returns the granted scopes.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Returns the account, if present.
    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Consumes the result and returns its account.
    #[must_use]
    pub fn into_account(self) -> Option<Account> {
        self.account
    }

    /// Returns when the access token expires, if known.
    #[must_use]
    pub fn expires_on(&self) -> Option<DateTime<Utc>> {
        self.expires_on
    }

    /// Returns true if the token has a known expiry in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_on.is_some_and(|expires| expires <= Utc::now())
    }
}
