use async_trait::async_trait;

use crate::error::AppError;

/// A set of tokens returned from an OAuth provider after code exchange or refresh.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

/// The authorization-code half of an OAuth provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Unique provider identifier (e.g., "spotify").
    fn id(&self) -> &str;

    /// Human-readable display name (e.g., "Spotify").
    fn display_name(&self) -> &str;

    /// Build the authorization URL that the user should be redirected to.
    ///
    /// - `scopes`: The OAuth scopes to request.
    /// - `state`: An opaque, HMAC-signed state string for CSRF protection.
    /// - `redirect_uri`: The callback URL registered with the provider.
    fn auth_url(&self, scopes: &[String], state: &str, redirect_uri: &str) -> String;

    /// Exchange an authorization code for an access token and refresh token.
    ///
    /// A rejected code surfaces as [`AppError::Authorization`].
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenSet, AppError>;

    /// Mint a new access token from a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, AppError>;
}
