//! Core data model for the admin-sso authentication adapter.
//!
//! This crate provides the types exchanged between an admin panel and an
//! identity-provider client: accounts, token results, and the request
//! shapes used for login, silent token acquisition, and logout.

pub mod account;
pub mod request;
pub mod token;

pub use account::{Account, LocalAccountId};
pub use request::{DEFAULT_SCOPE, EndSessionRequest, RedirectRequest, SilentRequest, TokenRequest};
pub use token::AuthenticationResult;
