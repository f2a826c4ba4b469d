//! Permission and identity derivation.
//!
//! The controller never decides what an account may do or how it is
//! displayed; it hands the active account to a [`PermissionsStrategy`] and
//! an [`IdentityStrategy`] and returns their answers unchanged.

use crate::error::AuthError;
use admin_sso_core::Account;
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Permissions granted to the current user, as opaque names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    /// Returns an empty permission set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if `permission` is granted.
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Returns true if nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over granted permissions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Permissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The current user as the admin panel displays it.
///
/// `fields` carries every other attribute of the source account, flattened
/// next to `id` and `fullName` when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Identifier the admin panel keys the user by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name shown in the user menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Remaining account attributes.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Derives permissions from the active account.
#[async_trait]
pub trait PermissionsStrategy: Send + Sync {
    /// Computes permissions; `account` is `None` when nobody is active.
    async fn permissions(&self, account: Option<&Account>)
    -> Result<Permissions, Report<AuthError>>;
}

/// Derives the displayed identity from the active account.
#[async_trait]
pub trait IdentityStrategy: Send + Sync {
    /// Computes the identity; `account` is `None` when nobody is active.
    async fn identity(&self, account: Option<&Account>)
    -> Result<UserIdentity, Report<AuthError>>;
}

/// Grants nothing. The default permissions strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPermissions;

#[async_trait]
impl PermissionsStrategy for NoPermissions {
    async fn permissions(
        &self,
        _account: Option<&Account>,
    ) -> Result<Permissions, Report<AuthError>> {
        Ok(Permissions::none())
    }
}

/// Reads permissions from a string-array claim of the ID token.
#[derive(Debug, Clone)]
pub struct ClaimPermissions {
    claim: String,
}

impl ClaimPermissions {
    /// Reads permissions from `claim`.
    #[must_use]
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
        }
    }

    /// Returns the claim name.
    #[must_use]
    pub fn claim(&self) -> &str {
        &self.claim
    }
}

impl Default for ClaimPermissions {
    /// Reads the `roles` claim.
    fn default() -> Self {
        Self::new("roles")
    }
}

#[async_trait]
impl PermissionsStrategy for ClaimPermissions {
    async fn permissions(
        &self,
        account: Option<&Account>,
    ) -> Result<Permissions, Report<AuthError>> {
        Ok(account
            .map(|account| account.string_list_claim(&self.claim).into_iter().collect())
            .unwrap_or_default())
    }
}

/// Projects the account's local ID as `id` and its username as
/// `fullName`, keeping every other account field. The default identity
/// strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountIdentity;

#[async_trait]
impl IdentityStrategy for AccountIdentity {
    async fn identity(
        &self,
        account: Option<&Account>,
    ) -> Result<UserIdentity, Report<AuthError>> {
        let Some(account) = account else {
            return Ok(UserIdentity::default());
        };
        let fields = match serde_json::to_value(account) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => Map::new(),
            Err(e) => {
                return Err(AuthError::Derivation {
                    details: format!("account is not serializable: {e}"),
                }
                .into());
            }
        };
        Ok(UserIdentity {
            id: Some(account.local_account_id().to_string()),
            full_name: Some(account.username().to_string()),
            avatar: None,
            fields,
        })
    }
}
