//! Refresh-before-use for the stored credential.
//!
//! Called on the read path: if the access token expires within
//! [`REFRESH_SKEW_SECS`], the refresh grant is run and the replacement is
//! saved (replace-all). A failed refresh leaves the store untouched and hands
//! back the stale credential; the remote call then fails and the page degrades.

use tracing::{info, warn};

use super::db::{Credential, CredentialStore};
use crate::providers::OAuthProvider;

/// Refresh this many seconds before the recorded expiry.
pub const REFRESH_SKEW_SECS: i64 = 60;

pub async fn refresh_if_expired(
    store: &dyn CredentialStore,
    provider: &dyn OAuthProvider,
    credential: Credential,
    now: i64,
) -> Credential {
    if !credential.is_expired_at(now, REFRESH_SKEW_SECS) {
        return credential;
    }

    if !credential.can_refresh() {
        warn!("Access token expired and no refresh token is stored; relogin required");
        return credential;
    }

    let tokens = match provider.refresh_token(&credential.refresh_token).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("Failed to refresh {} token: {e}", provider.id());
            return credential;
        }
    };

    let refreshed = Credential::from_token_set(tokens, now, Some(&credential.refresh_token));

    if let Err(e) = store.save(&refreshed).await {
        // The new token is still usable for this request.
        warn!("Refreshed token could not be persisted: {e}");
    } else {
        info!(expires_at = refreshed.expires_at, "Refreshed {} access token", provider.id());
    }

    refreshed
}
