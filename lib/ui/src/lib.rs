//! Admin panel login view.
//!
//! Sign-in happens on the identity provider's hosted page, so the login
//! route has nothing to ask the user for. It shows [`LoginPlaceholder`]
//! while the redirect is underway.

#![allow(non_snake_case)]

pub mod placeholder;

pub use placeholder::{LOADING_DELAY, LoginPlaceholder, PlaceholderPhase, shows_placeholder};

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::placeholder::LoginPlaceholder;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(LoginPlaceholder);
}
