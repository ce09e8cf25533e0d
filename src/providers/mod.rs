mod spotify;
mod traits;

pub use spotify::SpotifyProvider;
pub use traits::{OAuthProvider, TokenSet};

use crate::config::Config;

/// Build the Spotify provider from the configured client credentials.
///
/// Missing credentials are not an error here: the provider rejects the
/// login instead.
pub fn spotify_from_config(config: &Config) -> SpotifyProvider {
    SpotifyProvider::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.accounts_url.clone(),
    )
}
