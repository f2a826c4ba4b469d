//! Single-flight initialization of the identity client.
//!
//! The first call to [`InitializationGate::initialize`] starts the client's
//! startup handshake and stores it as a shared pending operation. Every
//! later or concurrent call awaits that same operation, so the handshake
//! runs at most once per gate.
//!
//! A failed handshake is stored like a successful one: every waiter sees
//! the failure and the gate never retries. A host that needs a retry must
//! construct a new gate (or restart the process when using the global one).

use crate::client::IdentityClient;
use crate::error::{AuthError, ClientError};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use rootcause::prelude::Report;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tracing::{debug, warn};

type Handshake = Shared<BoxFuture<'static, Result<(), ClientError>>>;

static GLOBAL: LazyLock<InitializationGate> = LazyLock::new(InitializationGate::new);

/// Guards the identity client's one-time startup handshake.
///
/// Cloning a gate shares its state.
#[derive(Clone, Default)]
pub struct InitializationGate {
    handshake: Arc<Mutex<Option<Handshake>>>,
}

impl InitializationGate {
    /// Creates a gate that has not started a handshake.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide gate.
    ///
    /// The global gate remembers only the first client it was asked to
    /// initialize; later clients attach to that handshake.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Returns true once a handshake has been started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.handshake
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Initializes `client` once and hands it back when the handshake has
    /// completed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Initialization`] when the handshake failed, for
    /// this call and every call after it.
    pub async fn initialize(
        &self,
        client: Arc<dyn IdentityClient>,
    ) -> Result<Arc<dyn IdentityClient>, Report<AuthError>> {
        let handshake = {
            let mut slot = self.handshake.lock().unwrap_or_else(PoisonError::into_inner);
            slot.get_or_insert_with(|| {
                debug!("starting identity client handshake");
                let client = Arc::clone(&client);
                async move { client.initialize().await }.boxed().shared()
            })
            .clone()
        };

        match handshake.await {
            Ok(()) => Ok(client),
            Err(error) => {
                warn!(%error, "identity client handshake failed");
                Err(AuthError::Initialization {
                    details: error.to_string(),
                }
                .into())
            }
        }
    }
}

impl std::fmt::Debug for InitializationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationGate")
            .field("started", &self.is_started())
            .finish()
    }
}
