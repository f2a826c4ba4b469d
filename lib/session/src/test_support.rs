//! Scripted identity client shared by the unit tests.

use crate::client::IdentityClient;
use crate::error::ClientError;
use admin_sso_core::{Account, AuthenticationResult, EndSessionRequest, RedirectRequest, SilentRequest};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory identity client that answers from a script and records calls.
pub(crate) struct ScriptedClient {
    active: Mutex<Option<Account>>,
    cached: Vec<Account>,
    token: Result<Option<AuthenticationResult>, ClientError>,
    redirect: Result<Option<AuthenticationResult>, ClientError>,
    init: Result<(), ClientError>,
    login_error: Option<ClientError>,
    init_calls: AtomicUsize,
    redirect_calls: AtomicUsize,
    token_requests: Mutex<Vec<SilentRequest>>,
    login_requests: Mutex<Vec<RedirectRequest>>,
    logout_requests: Mutex<Vec<EndSessionRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self {
            active: Mutex::new(None),
            cached: Vec::new(),
            token: Ok(None),
            redirect: Ok(None),
            init: Ok(()),
            login_error: None,
            init_calls: AtomicUsize::new(0),
            redirect_calls: AtomicUsize::new(0),
            token_requests: Mutex::new(Vec::new()),
            login_requests: Mutex::new(Vec::new()),
            logout_requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_active_account(self, account: Account) -> Self {
        *self.active.lock().unwrap() = Some(account);
        self
    }

    pub(crate) fn with_cached_accounts(mut self, accounts: Vec<Account>) -> Self {
        self.cached = accounts;
        self
    }

    pub(crate) fn with_token(mut self, access_token: &str) -> Self {
        self.token = Ok(Some(AuthenticationResult::new(access_token)));
        self
    }

    pub(crate) fn with_token_error(mut self, error: ClientError) -> Self {
        self.token = Err(error);
        self
    }

    pub(crate) fn with_redirect_account(mut self, account: Account) -> Self {
        self.redirect = Ok(Some(
            AuthenticationResult::new("redirect-token").with_account(Some(account)),
        ));
        self
    }

    pub(crate) fn with_redirect_error(mut self, error: ClientError) -> Self {
        self.redirect = Err(error);
        self
    }

    pub(crate) fn with_init_error(mut self, error: ClientError) -> Self {
        self.init = Err(error);
        self
    }

    pub(crate) fn with_login_error(mut self, error: ClientError) -> Self {
        self.login_error = Some(error);
        self
    }

    pub(crate) fn current_active_account(&self) -> Option<Account> {
        self.active.lock().unwrap().clone()
    }

    pub(crate) fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn redirect_calls(&self) -> usize {
        self.redirect_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn token_requests(&self) -> Vec<SilentRequest> {
        self.token_requests.lock().unwrap().clone()
    }

    pub(crate) fn login_requests(&self) -> Vec<RedirectRequest> {
        self.login_requests.lock().unwrap().clone()
    }

    pub(crate) fn logout_requests(&self) -> Vec<EndSessionRequest> {
        self.logout_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityClient for ScriptedClient {
    async fn initialize(&self) -> Result<(), ClientError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        // Stay pending across a few polls so concurrent callers overlap.
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.init.clone()
    }

    fn active_account(&self) -> Option<Account> {
        self.active.lock().unwrap().clone()
    }

    fn all_accounts(&self) -> Vec<Account> {
        self.cached.clone()
    }

    fn set_active_account(&self, account: Option<Account>) {
        *self.active.lock().unwrap() = account;
    }

    async fn acquire_token_silent(
        &self,
        request: SilentRequest,
    ) -> Result<Option<AuthenticationResult>, ClientError> {
        let account = request.account.clone();
        self.token_requests.lock().unwrap().push(request);
        self.token
            .clone()
            .map(|token| token.map(|result| result.with_account(Some(account))))
    }

    async fn login_redirect(&self, request: RedirectRequest) -> Result<(), ClientError> {
        self.login_requests.lock().unwrap().push(request);
        match &self.login_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn logout_redirect(&self, request: EndSessionRequest) -> Result<(), ClientError> {
        self.logout_requests.lock().unwrap().push(request);
        Ok(())
    }

    async fn handle_redirect_promise(&self) -> Result<Option<AuthenticationResult>, ClientError> {
        self.redirect_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.redirect.clone()
    }
}
