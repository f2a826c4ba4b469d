//! Auth session controller.
//!
//! The controller is the admin panel's auth contract. It stores no session
//! state of its own: every operation derives the session from the identity
//! client's current accounts and tokens. The only persisted state is the
//! deep-link marker in session storage.
//!
//! Failure classification:
//!
//! | Operation         | Condition                              | Error                          |
//! |-------------------|----------------------------------------|--------------------------------|
//! | `check_auth`      | no account/token, auto-redirect on     | [`AuthError::Silent`]          |
//! | `check_auth`      | no account/token, auto-redirect off    | [`AuthError::Unauthorized`]    |
//! | `check_error`     | HTTP 401 or 403                        | [`AuthError::Unauthorized`]    |
//! | `handle_callback` | redirect resolved without an account   | [`AuthError::AuthenticationFailed`] |
//! | `logout`          | no active account                      | none, no-op                    |

use crate::client::{AccountLookup, IdentityClient, acquire_silently, resolve_account};
use crate::config::AuthConfig;
use crate::deep_link::DeepLinkMemory;
use crate::error::{AuthError, HttpError};
use crate::platform::BrowserPlatform;
use crate::redirect::RedirectResolution;
use crate::refresh::TokenRefresher;
use crate::strategy::{
    AccountIdentity, IdentityStrategy, NoPermissions, Permissions, PermissionsStrategy,
    UserIdentity,
};
use admin_sso_core::{Account, AuthenticationResult, EndSessionRequest};
use rootcause::prelude::Report;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Session status derived from the identity client.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No account is known and no login is underway.
    Unauthenticated,
    /// An account is signed in.
    Authenticated(Account),
    /// A login redirect was started and has not come back yet.
    PendingRedirect,
}

/// Errors that carry an HTTP status for [`AuthSessionController::check_error`].
pub trait ErrorStatus {
    /// Returns the HTTP status, if the error has one.
    fn status(&self) -> Option<u16>;
}

impl ErrorStatus for HttpError {
    fn status(&self) -> Option<u16> {
        HttpError::status(self)
    }
}

impl ErrorStatus for u16 {
    fn status(&self) -> Option<u16> {
        Some(*self)
    }
}

/// Builder for [`AuthSessionController`].
pub struct AuthSessionControllerBuilder {
    client: Arc<dyn IdentityClient>,
    config: AuthConfig,
    platform: Option<Arc<dyn BrowserPlatform>>,
    permissions: Arc<dyn PermissionsStrategy>,
    identity: Arc<dyn IdentityStrategy>,
    redirect: Option<RedirectResolution>,
}

impl AuthSessionControllerBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the browser platform used for deep-link preservation.
    ///
    /// Without a platform, deep links are not preserved.
    #[must_use]
    pub fn platform(mut self, platform: Arc<dyn BrowserPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the permissions strategy.
    #[must_use]
    pub fn permissions(mut self, strategy: impl PermissionsStrategy + 'static) -> Self {
        self.permissions = Arc::new(strategy);
        self
    }

    /// Sets the identity strategy.
    #[must_use]
    pub fn identity(mut self, strategy: impl IdentityStrategy + 'static) -> Self {
        self.identity = Arc::new(strategy);
        self
    }

    /// Shares an existing redirect resolution.
    ///
    /// Controllers built over the same client should share one resolution
    /// so the pending redirect is consumed once for all of them. It must
    /// have been created for the same client.
    #[must_use]
    pub fn redirect(mut self, redirect: RedirectResolution) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Validates the configuration and builds the controller.
    ///
    /// Unless [`redirect`](Self::redirect) supplied one, the controller
    /// gets its own [`RedirectResolution`], which stays idle until first
    /// polled. The host must spawn
    /// [`redirect_driver`](AuthSessionController::redirect_driver) at
    /// startup so a pending redirect is consumed even before the callback
    /// route renders.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfig`] if the configuration is invalid.
    pub fn build(self) -> Result<AuthSessionController, Report<AuthError>> {
        self.config.validate()?;

        let deep_link = match self.platform {
            Some(platform) if self.config.enable_deep_link_redirect && platform.is_available() => {
                Some(DeepLinkMemory::new(platform))
            }
            Some(_) | None => None,
        };
        debug!(
            deep_link = deep_link.is_some(),
            redirect_on_check_auth = self.config.redirect_on_check_auth,
            "auth session controller configured"
        );

        Ok(AuthSessionController {
            redirect: self
                .redirect
                .unwrap_or_else(|| RedirectResolution::new(Arc::clone(&self.client))),
            refresher: TokenRefresher::new(
                Arc::clone(&self.client),
                self.config.token_request.clone(),
            ),
            client: self.client,
            config: self.config,
            permissions: self.permissions,
            identity: self.identity,
            deep_link,
        })
    }
}

/// The admin panel's auth contract, backed by an identity client.
pub struct AuthSessionController {
    client: Arc<dyn IdentityClient>,
    config: AuthConfig,
    permissions: Arc<dyn PermissionsStrategy>,
    identity: Arc<dyn IdentityStrategy>,
    deep_link: Option<DeepLinkMemory>,
    redirect: RedirectResolution,
    refresher: TokenRefresher,
}

impl AuthSessionController {
    /// Starts building a controller with default configuration, no
    /// platform, no permissions, and the account identity projection.
    #[must_use]
    pub fn builder(client: Arc<dyn IdentityClient>) -> AuthSessionControllerBuilder {
        AuthSessionControllerBuilder {
            client,
            config: AuthConfig::default(),
            platform: None,
            permissions: Arc::new(NoPermissions),
            identity: Arc::new(AccountIdentity),
            redirect: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns the token refresher, for hosts that refresh on their own
    /// schedule.
    #[must_use]
    pub fn refresher(&self) -> &TokenRefresher {
        &self.refresher
    }

    /// Returns the redirect resolution, for sharing with other controllers
    /// over the same client.
    #[must_use]
    pub fn redirect_resolution(&self) -> &RedirectResolution {
        &self.redirect
    }

    /// Returns true if deep links are preserved across login.
    #[must_use]
    pub fn preserves_deep_links(&self) -> bool {
        self.deep_link.is_some()
    }

    /// Returns a future that consumes any pending login redirect.
    ///
    /// Spawn it once at startup.
    pub fn redirect_driver(&self) -> impl Future<Output = ()> + Send + 'static {
        self.redirect.driver()
    }

    /// Derives the current session state.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        if let Some(account) =
            resolve_account(self.client.as_ref(), AccountLookup::ActiveOrFirstCached)
        {
            return SessionState::Authenticated(account);
        }
        match self.deep_link.as_ref().and_then(DeepLinkMemory::pending) {
            Some(_) => SessionState::PendingRedirect,
            None => SessionState::Unauthenticated,
        }
    }

    /// Starts the login redirect, remembering the current URL first when
    /// deep links are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Platform`] if the marker cannot be stored and
    /// [`AuthError::Client`] if the redirect cannot be started.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<(), Report<AuthError>> {
        if let Some(deep_link) = &self.deep_link {
            deep_link.remember().map_err(AuthError::from)?;
        }
        info!(scopes = ?self.config.login_request.scopes, "starting login redirect");
        self.client
            .login_redirect(self.config.login_request.clone())
            .await
            .map_err(|e| AuthError::client("login", &e))?;
        Ok(())
    }

    /// Starts the logout redirect for the active account. Succeeds without
    /// doing anything when no account is active.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Client`] if the redirect cannot be started.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), Report<AuthError>> {
        let Some(account) = self.client.active_account() else {
            debug!("no active account, nothing to log out");
            return Ok(());
        };
        info!(account = %account.local_account_id(), "starting logout redirect");
        self.client
            .logout_redirect(EndSessionRequest::new(account))
            .await
            .map_err(|e| AuthError::client("logout", &e))?;
        Ok(())
    }

    /// Classifies an error from the data layer.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] for HTTP 401 and 403.
    pub fn check_error<E: ErrorStatus + ?Sized>(&self, error: &E) -> Result<(), Report<AuthError>> {
        match error.status() {
            Some(status @ (401 | 403)) => {
                debug!(status, "API rejected credentials");
                Err(AuthError::Unauthorized.into())
            }
            _ => Ok(()),
        }
    }

    /// Route guard: succeeds when an account holds a token.
    ///
    /// Runs the token refresher first.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Silent`] after starting the login redirect when
    /// auto-redirect is on, [`AuthError::Unauthorized`] when it is off, and
    /// [`AuthError::Client`] if the identity client faulted.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) -> Result<(), Report<AuthError>> {
        self.refresher.refresh().await?;

        let account = resolve_account(self.client.as_ref(), AccountLookup::ActiveOrFirstCached);
        let token = match &account {
            Some(account) => {
                acquire_silently(self.client.as_ref(), account, &self.config.token_request)
                    .await
                    .map_err(|e| AuthError::client("check_auth", &e))?
            }
            None => None,
        };

        if account.is_some() && token.is_some() {
            return Ok(());
        }

        if self.config.redirect_on_check_auth {
            debug!(
                has_account = account.is_some(),
                "no session, redirecting to login"
            );
            self.login().await?;
            return Err(AuthError::Silent.into());
        }
        debug!(has_account = account.is_some(), "no session");
        Err(AuthError::Unauthorized.into())
    }

    /// Derives permissions for the active account.
    ///
    /// Runs the token refresher first.
    ///
    /// # Errors
    ///
    /// Returns refresher failures and whatever the strategy reports.
    #[instrument(skip(self))]
    pub async fn permissions(&self) -> Result<Permissions, Report<AuthError>> {
        self.refresher.refresh().await?;
        let account = resolve_account(self.client.as_ref(), AccountLookup::ActiveOnly);
        self.permissions.permissions(account.as_ref()).await
    }

    /// Derives the displayed identity for the active account.
    ///
    /// Runs the token refresher first.
    ///
    /// # Errors
    ///
    /// Returns refresher failures and whatever the strategy reports.
    #[instrument(skip(self))]
    pub async fn identity(&self) -> Result<UserIdentity, Report<AuthError>> {
        self.refresher.refresh().await?;
        let account = resolve_account(self.client.as_ref(), AccountLookup::ActiveOnly);
        self.identity.identity(account.as_ref()).await
    }

    /// Completes the login redirect: activates the returned account and,
    /// when deep links are preserved, sends the browser back to the
    /// remembered URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] if the redirect yielded
    /// no account, [`AuthError::Client`] if resolving it faulted, and
    /// [`AuthError::Platform`] if the browser could not navigate.
    #[instrument(skip(self))]
    pub async fn handle_callback(&self) -> Result<(), Report<AuthError>> {
        let outcome = self
            .redirect
            .settled()
            .await
            .map_err(|e| AuthError::client("handle_callback", &e))?;

        let Some(account) = outcome.and_then(AuthenticationResult::into_account) else {
            warn!("login redirect returned no account");
            return Err(AuthError::AuthenticationFailed.into());
        };

        info!(account = %account.local_account_id(), "login redirect completed");
        self.client.set_active_account(Some(account));

        if let Some(deep_link) = &self.deep_link {
            deep_link.restore().map_err(AuthError::from)?;
        }
        Ok(())
    }

    /// Runs the token refresher.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Client`] if the identity client faulted.
    pub async fn refresh_auth(&self) -> Result<(), Report<AuthError>> {
        self.refresher.refresh().await
    }
}

impl std::fmt::Debug for AuthSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionController")
            .field("config", &self.config)
            .field("deep_link", &self.deep_link)
            .field("redirect", &self.redirect)
            .finish_non_exhaustive()
    }
}
