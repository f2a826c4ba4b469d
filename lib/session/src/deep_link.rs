//! Deep-link redirect memory.
//!
//! Before a login redirect the current URL is stored under
//! [`REDIRECT_MARKER_KEY`] in session storage. After the provider sends the
//! browser back and the callback succeeds, the marker is read, the browser
//! is sent to it, and the marker is removed. Only the latest login's origin
//! survives; a second login before the first completes overwrites it.

use crate::error::PlatformError;
use crate::platform::BrowserPlatform;
use std::sync::Arc;
use tracing::debug;

/// Session storage key holding the pre-login URL.
pub const REDIRECT_MARKER_KEY: &str = "_admin_sso_redirect_key";

/// Location used when neither a marker nor an origin is known.
const FALLBACK_LOCATION: &str = "/";

/// Stores and restores the URL the user was on before logging in.
#[derive(Clone)]
pub struct DeepLinkMemory {
    platform: Arc<dyn BrowserPlatform>,
}

impl DeepLinkMemory {
    /// Creates a memory backed by `platform`.
    #[must_use]
    pub fn new(platform: Arc<dyn BrowserPlatform>) -> Self {
        Self { platform }
    }

    /// Returns the stored marker, if any.
    #[must_use]
    pub fn pending(&self) -> Option<String> {
        self.platform.session_get(REDIRECT_MARKER_KEY)
    }

    /// Stores the current URL as the marker and returns it.
    ///
    /// Does nothing when the platform cannot report a location.
    pub fn remember(&self) -> Result<Option<String>, PlatformError> {
        let Some(href) = self.platform.current_href() else {
            debug!("no current location to remember");
            return Ok(None);
        };
        self.platform.session_set(REDIRECT_MARKER_KEY, &href)?;
        debug!(%href, "remembered pre-login location");
        Ok(Some(href))
    }

    /// Navigates to the marker (or the origin), clears the marker, and
    /// returns the target URL.
    pub fn restore(&self) -> Result<String, PlatformError> {
        let target = self
            .pending()
            .or_else(|| self.platform.origin())
            .unwrap_or_else(|| FALLBACK_LOCATION.to_string());
        self.platform.replace_location(&target)?;
        self.platform.session_remove(REDIRECT_MARKER_KEY);
        debug!(%target, "restored pre-login location");
        Ok(target)
    }
}

impl std::fmt::Debug for DeepLinkMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLinkMemory")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryPlatform;

    fn memory() -> (Arc<MemoryPlatform>, DeepLinkMemory) {
        let platform = Arc::new(MemoryPlatform::new(
            "https://app.example",
            "https://app.example/reports",
        ));
        let memory = DeepLinkMemory::new(platform.clone());
        (platform, memory)
    }

    #[test]
    fn remember_then_restore() {
        let (platform, memory) = memory();

        memory.remember().expect("remember");
        platform.set_href("https://login.example/authorize");
        let target = memory.restore().expect("restore");

        assert_eq!(target, "https://app.example/reports");
        assert_eq!(platform.navigations(), vec!["https://app.example/reports"]);
        assert_eq!(memory.pending(), None);
    }

    #[test]
    fn restore_without_marker_goes_to_origin() {
        let (platform, memory) = memory();

        let target = memory.restore().expect("restore");

        assert_eq!(target, "https://app.example");
        assert_eq!(platform.navigations(), vec!["https://app.example"]);
    }

    #[test]
    fn second_remember_overwrites_marker() {
        let (platform, memory) = memory();

        memory.remember().expect("first");
        platform.set_href("https://app.example/users/7");
        memory.remember().expect("second");

        assert_eq!(
            memory.pending(),
            Some("https://app.example/users/7".to_string())
        );
    }

    #[test]
    fn marker_uses_fixed_key() {
        let (platform, memory) = memory();
        memory.remember().expect("remember");

        assert_eq!(
            platform.session_get(REDIRECT_MARKER_KEY),
            Some("https://app.example/reports".to_string())
        );
    }
}
