//! Identity-provider accounts.
//!
//! An [`Account`] is one identity signed in through the provider's
//! redirect ceremony. The identity client owns the cache of accounts; the
//! adapter only reads them, picks the active one, and projects them into
//! the admin panel's identity and permission shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identifier of an account within its tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalAccountId(String);

impl LocalAccountId {
    /// Creates a new local account ID from a string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the local account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LocalAccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LocalAccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An account known to the identity client.
///
/// Serializes with the provider's camelCase field names so that identity
/// projections carry the same keys the provider reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Identifier of the account across tenants (`<oid>.<tid>`).
    #[serde(default)]
    home_account_id: String,
    /// Authority host that issued the account.
    #[serde(default)]
    environment: String,
    /// Directory the account was signed in to.
    #[serde(default)]
    tenant_id: String,
    /// Identifier of the account within its tenant.
    local_account_id: LocalAccountId,
    /// Sign-in name, usually an email address or UPN.
    username: String,
    /// Display name, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Claims from the ID token that created this account.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    id_token_claims: Map<String, Value>,
}

impl Account {
    /// Creates an account with the two identifying fields; everything
    /// else starts empty.
    #[must_use]
    pub fn new(local_account_id: impl Into<LocalAccountId>, username: impl Into<String>) -> Self {
        Self {
            home_account_id: String::new(),
            environment: String::new(),
            tenant_id: String::new(),
            local_account_id: local_account_id.into(),
            username: username.into(),
            name: None,
            id_token_claims: Map::new(),
        }
    }

    /// Sets the home account ID.
    #[must_use]
    pub fn with_home_account_id(mut self, home_account_id: impl Into<String>) -> Self {
        self.home_account_id = home_account_id.into();
        self
    }

    /// Sets the authority environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Sets the tenant ID.
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Sets the ID token claims.
    #[must_use]
    pub fn with_id_token_claims(mut self, claims: Map<String, Value>) -> Self {
        self.id_token_claims = claims;
        self
    }

    /// Returns the home account ID.
    #[must_use]
    pub fn home_account_id(&self) -> &str {
        &self.home_account_id
    }

    /// Returns the authority environment.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the tenant ID.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Returns the local account ID.
    #[must_use]
    pub fn local_account_id(&self) -> &LocalAccountId {
        &self.local_account_id
    }

    /// Returns the sign-in name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the display name, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns all ID token claims.
    #[must_use]
    pub fn id_token_claims(&self) -> &Map<String, Value> {
        &self.id_token_claims
    }

    /// Returns a single ID token claim.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.id_token_claims.get(name)
    }

    /// Returns the string members of an array claim.
    ///
    /// Missing claims, non-array claims and non-string members yield nothing.
    #[must_use]
    pub fn string_list_claim(&self, name: &str) -> Vec<&str> {
        self.claim(name)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
