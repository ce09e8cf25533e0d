//! OAuth authorization-code flow against the configured provider.
//!
//! ```text
//! Unauthenticated --begin_login--> PendingCallback --handle_callback--> Authenticated
//!        ^                                                                  |
//!        +--------------------------------logout----------------------------+
//! ```
//!
//! `Authenticated` is whatever the credential store says; the only extra
//! in-memory state is when the last login was started.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::crypto::engine::{StateSigner, STATE_MAX_AGE_SECS};
use crate::error::AppError;
use crate::providers::OAuthProvider;
use crate::store::{refresh_if_expired, Credential, CredentialStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Unauthenticated,
    PendingCallback,
    Authenticated,
}

pub struct OAuthFlow {
    provider: Box<dyn OAuthProvider>,
    store: Arc<dyn CredentialStore>,
    signer: StateSigner,
    scopes: Vec<String>,
    redirect_uri: String,
    auto_refresh: bool,
    /// Unix time the last unfinished login was started.
    pending_since: Mutex<Option<i64>>,
}

impl OAuthFlow {
    pub fn new(
        config: &Config,
        provider: Box<dyn OAuthProvider>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            provider,
            store,
            signer: StateSigner::new(&config.session_secret),
            scopes: config.scopes.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auto_refresh: config.auto_refresh,
            pending_since: Mutex::new(None),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.display_name()
    }

    /// Build the provider authorization URL and mark a login as pending.
    pub fn begin_login(&self) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let state = self.signer.issue(now)?;
        let url = self.provider.auth_url(&self.scopes, &state, &self.redirect_uri);

        self.set_pending(Some(now));
        info!(redirect_uri = %self.redirect_uri, "Starting {} login", self.provider.id());
        Ok(url)
    }

    /// Exchange the authorization code and persist the resulting credential.
    ///
    /// An empty or missing code fails before the store or provider is touched.
    pub async fn handle_callback(
        &self,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<Credential, AppError> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Authorization("no code returned".into()))?;

        let state = state
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Authorization("missing state parameter".into()))?;

        let now = Utc::now().timestamp();
        self.signer.verify(state, now)?;

        let tokens = self.provider.exchange_code(code, &self.redirect_uri).await?;
        let credential = Credential::from_token_set(tokens, now, None);

        self.store.save(&credential).await?;
        self.set_pending(None);

        info!(expires_at = credential.expires_at, "{} account connected", self.provider.display_name());
        Ok(credential)
    }

    /// Forget the stored credential. Safe to call when already logged out.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.set_pending(None);
        self.store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Read-only: never refreshes or writes the stored credential.
    pub async fn status(&self) -> FlowState {
        match self.store.load().await {
            Ok(Some(_)) => return FlowState::Authenticated,
            Ok(None) => {}
            Err(e) => warn!("Could not read stored credential: {e}"),
        }

        let now = Utc::now().timestamp();
        match self.pending() {
            Some(started) if now - started <= STATE_MAX_AGE_SECS => FlowState::PendingCallback,
            _ => FlowState::Unauthenticated,
        }
    }

    /// The credential to use for this request, if any.
    ///
    /// Store failures are logged and reported as "not connected". When
    /// auto-refresh is on, an expired access token is refreshed first.
    pub async fn current_credential(&self) -> Option<Credential> {
        let credential = match self.store.load().await {
            Ok(Some(c)) => c,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read stored credential: {e}");
                return None;
            }
        };

        if !self.auto_refresh {
            return Some(credential);
        }

        let now = Utc::now().timestamp();
        Some(refresh_if_expired(self.store.as_ref(), self.provider.as_ref(), credential, now).await)
    }

    fn pending(&self) -> Option<i64> {
        *self
            .pending_since
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_pending(&self, value: Option<i64>) {
        *self
            .pending_since
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}
