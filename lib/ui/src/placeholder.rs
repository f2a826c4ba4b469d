//! Login placeholder component.

use admin_sso_session::AuthError;
use leptos::leptos_dom::helpers::set_timeout;
use leptos::prelude::*;
use std::time::Duration;

/// How long the placeholder stays blank before showing a spinner.
pub const LOADING_DELAY: Duration = Duration::from_secs(1);

/// What the placeholder shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderPhase {
    /// Nothing yet; most redirects leave before the delay ends.
    Waiting,
    /// The redirect is slow; show the loading indicator.
    Loading,
}

impl PlaceholderPhase {
    /// Returns true if the loading indicator is visible.
    #[must_use]
    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }
}

/// Returns true if a failed auth check should render the placeholder
/// instead of an error message.
///
/// Only the silent failure qualifies: it means the browser is already on
/// its way to the identity provider.
#[must_use]
pub fn shows_placeholder(error: &AuthError) -> bool {
    error.is_silent()
}

/// Login page - blank at first, then a loading indicator if the redirect
/// to the identity provider takes longer than [`LOADING_DELAY`].
#[component]
pub fn LoginPlaceholder() -> impl IntoView {
    let (phase, set_phase) = signal(PlaceholderPhase::Waiting);

    // Effects only run in the browser, so SSR renders the blank phase.
    Effect::new(move |_| {
        set_timeout(
            move || set_phase.set(PlaceholderPhase::Loading),
            LOADING_DELAY,
        );
    });

    move || {
        phase.get().is_loading().then(|| {
            view! {
                <div class="login-placeholder">
                    <div class="loading-spinner"></div>
                    <p>"Redirecting to sign in..."</p>
                </div>
            }
        })
    }
}
