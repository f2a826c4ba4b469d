//! Browser location and session storage.
//!
//! Deep-link preservation runs outside the admin panel's router, so it
//! talks to the browser directly through [`BrowserPlatform`]. `WebPlatform`
//! (feature `browser`) is the wasm implementation; `MemoryPlatform` serves
//! server-side hosts and tests.

use crate::error::PlatformError;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Direct access to the browser's location and session storage.
pub trait BrowserPlatform: Send + Sync {
    /// Returns true if both a window and session storage exist.
    fn is_available(&self) -> bool;

    /// Returns the full current URL.
    fn current_href(&self) -> Option<String>;

    /// Returns the current origin (`scheme://host[:port]`).
    fn origin(&self) -> Option<String>;

    /// Replaces the current location, without a history entry.
    fn replace_location(&self, url: &str) -> Result<(), PlatformError>;

    /// Reads a session storage entry.
    fn session_get(&self, key: &str) -> Option<String>;

    /// Writes a session storage entry.
    fn session_set(&self, key: &str, value: &str) -> Result<(), PlatformError>;

    /// Removes a session storage entry.
    fn session_remove(&self, key: &str);
}

#[derive(Debug, Default)]
struct MemoryState {
    href: Option<String>,
    storage: HashMap<String, String>,
    navigations: Vec<String>,
}

/// In-process platform with a settable location and its own storage.
///
/// Navigations are recorded and also update the current location.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    origin: Option<String>,
    state: Mutex<MemoryState>,
}

impl MemoryPlatform {
    /// Creates a platform whose location starts at `href`.
    #[must_use]
    pub fn new(origin: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            state: Mutex::new(MemoryState {
                href: Some(href.into()),
                ..MemoryState::default()
            }),
        }
    }

    /// Moves the current location without recording a navigation.
    pub fn set_href(&self, href: impl Into<String>) {
        self.lock().href = Some(href.into());
    }

    /// Returns every URL navigated to, oldest first.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BrowserPlatform for MemoryPlatform {
    fn is_available(&self) -> bool {
        true
    }

    fn current_href(&self) -> Option<String> {
        self.lock().href.clone()
    }

    fn origin(&self) -> Option<String> {
        self.origin.clone()
    }

    fn replace_location(&self, url: &str) -> Result<(), PlatformError> {
        let mut state = self.lock();
        state.href = Some(url.to_string());
        state.navigations.push(url.to_string());
        Ok(())
    }

    fn session_get(&self, key: &str) -> Option<String> {
        self.lock().storage.get(key).cloned()
    }

    fn session_set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.lock()
            .storage
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn session_remove(&self, key: &str) {
        self.lock().storage.remove(key);
    }
}

#[cfg(feature = "browser")]
pub use web::WebPlatform;

#[cfg(feature = "browser")]
mod web {
    use super::BrowserPlatform;
    use crate::error::PlatformError;
    use web_sys::{Storage, Window};

    /// The real browser, reached through `web-sys`.
    ///
    /// Holds no handles; the window is looked up on every call.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WebPlatform;

    impl WebPlatform {
        fn window() -> Option<Window> {
            web_sys::window()
        }

        fn storage() -> Option<Storage> {
            Self::window()?.session_storage().ok().flatten()
        }
    }

    fn describe(value: &wasm_bindgen::JsValue) -> String {
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"))
    }

    impl BrowserPlatform for WebPlatform {
        fn is_available(&self) -> bool {
            Self::storage().is_some()
        }

        fn current_href(&self) -> Option<String> {
            Self::window()?.location().href().ok()
        }

        fn origin(&self) -> Option<String> {
            Self::window()?.location().origin().ok()
        }

        fn replace_location(&self, url: &str) -> Result<(), PlatformError> {
            let window = Self::window().ok_or(PlatformError::Unavailable)?;
            window
                .location()
                .replace(url)
                .map_err(|e| PlatformError::Navigation {
                    url: url.to_string(),
                    details: describe(&e),
                })
        }

        fn session_get(&self, key: &str) -> Option<String> {
            Self::storage()?.get_item(key).ok().flatten()
        }

        fn session_set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
            let storage = Self::storage().ok_or(PlatformError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|e| PlatformError::Storage {
                    key: key.to_string(),
                    details: describe(&e),
                })
        }

        fn session_remove(&self, key: &str) {
            if let Some(storage) = Self::storage() {
                let _ = storage.remove_item(key);
            }
        }
    }
}
