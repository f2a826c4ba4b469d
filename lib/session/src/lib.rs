//! Admin panel authentication backed by a redirect-based identity client.
//!
//! This crate provides:
//! - The identity client seam (`IdentityClient`) and account resolution
//! - One-shot client initialization shared by every caller (`InitializationGate`)
//! - The auth contract the admin panel calls (`AuthSessionController`)
//! - Bearer-token injection for data requests (`RequestAuthorizer`)
//! - Best-effort token refresh (`TokenRefresher`)
//! - Deep-link preservation across the login redirect (`DeepLinkMemory`)
//!
//! # Session model
//!
//! Nothing here stores a session. The identity client owns accounts and the
//! token cache; every operation derives the session from it on demand. The
//! only state this crate persists is the pre-login URL, kept in browser
//! session storage under [`REDIRECT_MARKER_KEY`].
//!
//! # Example
//!
//! ```ignore
//! use admin_sso_session::{AuthConfig, AuthSessionController, InitializationGate};
//!
//! let client = InitializationGate::global().initialize(client).await?;
//! let controller = AuthSessionController::builder(client)
//!     .config(AuthConfig::from_env()?)
//!     .platform(platform)
//!     .build()?;
//!
//! spawn(controller.redirect_driver());
//! controller.check_auth().await?;
//! ```

pub mod authorizer;
pub mod client;
pub mod config;
pub mod controller;
pub mod deep_link;
pub mod error;
pub mod gate;
pub mod platform;
pub mod redirect;
pub mod refresh;
pub mod strategy;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export main types at crate root
pub use authorizer::{AuthorizationContext, RequestAuthorizer};
pub use client::{AccountLookup, IdentityClient, acquire_silently, resolve_account};
pub use config::AuthConfig;
pub use controller::{AuthSessionController, AuthSessionControllerBuilder, ErrorStatus, SessionState};
pub use deep_link::{DeepLinkMemory, REDIRECT_MARKER_KEY};
pub use error::{AuthError, ClientError, HttpError, PlatformError};
pub use gate::InitializationGate;
#[cfg(feature = "browser")]
pub use platform::WebPlatform;
pub use platform::{BrowserPlatform, MemoryPlatform};
pub use redirect::RedirectResolution;
pub use refresh::TokenRefresher;
pub use strategy::{
    AccountIdentity, ClaimPermissions, IdentityStrategy, NoPermissions, Permissions,
    PermissionsStrategy, UserIdentity,
};
pub use transport::{HttpTransport, JsonResponse, ReqwestTransport, RequestOptions};
