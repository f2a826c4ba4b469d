//! Adapter configuration.
//!
//! [`AuthConfig`] enumerates every option the session controller, token
//! refresher and request authorizer recognise. Omitted fields take the
//! documented defaults, so an empty source yields a working configuration.

use crate::error::AuthError;
use admin_sso_core::{RedirectRequest, TokenRequest};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for [`AuthConfig::from_env`].
pub const ENV_PREFIX: &str = "ADMIN_SSO";

/// Configuration of the auth session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Request used for the login redirect.
    /// Default: scopes `["User.Read"]`
    #[serde(default)]
    pub login_request: RedirectRequest,
    /// Request used for silent token acquisition.
    /// Default: scopes `["User.Read"]`, no forced refresh
    #[serde(default)]
    pub token_request: TokenRequest,
    /// Start the login redirect when a route guard finds no session.
    /// Default: true
    #[serde(default = "default_true")]
    pub redirect_on_check_auth: bool,
    /// Return the user to the pre-login URL after the redirect round trip.
    /// Default: true
    #[serde(default = "default_true")]
    pub enable_deep_link_redirect: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_request: RedirectRequest::default(),
            token_request: TokenRequest::default(),
            redirect_on_check_auth: default_true(),
            enable_deep_link_redirect: default_true(),
        }
    }
}

impl AuthConfig {
    /// Loads configuration from `ADMIN_SSO__*` environment variables.
    ///
    /// Nested fields use `__` (`ADMIN_SSO__TOKEN_REQUEST__FORCE_REFRESH`);
    /// scope lists are comma-separated.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("login_request.scopes")
                    .with_list_parse_key("token_request.scopes"),
            )
            .build()?
            .try_deserialize()
    }

    /// Parses configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or has
    /// mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(json, config::FileFormat::Json))
            .build()?
            .try_deserialize()
    }

    /// Checks the scope lists.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfig`] when a scope list is empty or
    /// contains a blank scope.
    pub fn validate(&self) -> Result<(), Report<AuthError>> {
        check_scopes("login_request", &self.login_request.scopes)?;
        check_scopes("token_request", &self.token_request.scopes)?;
        Ok(())
    }
}

fn check_scopes(field: &str, scopes: &[String]) -> Result<(), AuthError> {
    if scopes.is_empty() {
        return Err(AuthError::InvalidConfig {
            reason: format!("{field}.scopes must not be empty"),
        });
    }
    if scopes.iter().any(|scope| scope.trim().is_empty()) {
        return Err(AuthError::InvalidConfig {
            reason: format!("{field}.scopes contains a blank scope"),
        });
    }
    Ok(())
}
