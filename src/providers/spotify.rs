use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{OAuthProvider, TokenSet};
use crate::error::AppError;

/// Spotify Accounts service (OAuth 2.0 authorization-code flow).
///
/// Quirks:
/// - Client credentials go in an HTTP Basic header, not the form body.
/// - Access tokens live one hour.
/// - A refresh grant may or may not return a new refresh token.
pub struct SpotifyProvider {
    client_id: String,
    client_secret: String,
    accounts_url: String,
    http: reqwest::Client,
}

// Raw token response from the Spotify token endpoint
#[derive(Debug, Deserialize)]
struct SpotifyTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    token_type: String,
    expires_in: Option<u64>,
    scope: Option<String>,
}

impl From<SpotifyTokenResponse> for TokenSet {
    fn from(resp: SpotifyTokenResponse) -> Self {
        TokenSet {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            token_type: resp.token_type,
            expires_in: resp.expires_in,
            scope: resp.scope,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpotifyErrorResponse {
    error: String,
    error_description: Option<String>,
}

impl SpotifyProvider {
    pub fn new(client_id: String, client_secret: String, accounts_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            accounts_url,
            http: reqwest::Client::new(),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_url)
    }
}

#[async_trait]
impl OAuthProvider for SpotifyProvider {
    fn id(&self) -> &str {
        "spotify"
    }

    fn display_name(&self) -> &str {
        "Spotify"
    }

    fn auth_url(&self, scopes: &[String], state: &str, redirect_uri: &str) -> String {
        let scope_str = scopes.join(" ");
        format!(
            "{base}/authorize?\
             client_id={client_id}\
             &response_type=code\
             &redirect_uri={redirect_uri}\
             &scope={scope}\
             &state={state}",
            base = self.accounts_url,
            client_id = urlencoding(&self.client_id),
            redirect_uri = urlencoding(redirect_uri),
            scope = urlencoding(&scope_str),
            state = urlencoding(state),
        )
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenSet, AppError> {
        let resp = self
            .http
            .post(self.token_url())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AppError::Authorization(format!("Token exchange request failed: {e}")))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Authorization(format!(
                "Spotify token exchange failed: {}",
                describe_error(&body)
            )));
        }

        let token_resp: SpotifyTokenResponse = resp.json().await.map_err(|e| {
            AppError::Authorization(format!("Failed to parse token response: {e}"))
        })?;

        Ok(token_resp.into())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, AppError> {
        let resp = self
            .http
            .post(self.token_url())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::RefreshFailed(format!("Refresh request failed: {e}")))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::RefreshFailed(format!(
                "Spotify refresh failed: {}",
                describe_error(&body)
            )));
        }

        let token_resp: SpotifyTokenResponse = resp.json().await.map_err(|e| {
            AppError::RefreshFailed(format!("Failed to parse refresh response: {e}"))
        })?;

        Ok(token_resp.into())
    }
}

/// Prefer the OAuth `error_description` over the raw body.
fn describe_error(body: &str) -> String {
    match serde_json::from_str::<SpotifyErrorResponse>(body) {
        Ok(err) => match err.error_description {
            Some(desc) => format!("{} ({desc})", err.error),
            None => err.error,
        },
        Err(_) => body.to_string(),
    }
}

/// Simple percent-encoding for URL parameters.
fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
