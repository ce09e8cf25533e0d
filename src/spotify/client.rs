use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::{ApiErrorBody, Artist, ArtistSearch, Paging, TopTracks, Track, UserProfile};
use crate::config::Config;
use crate::error::AppError;

/// Read-only operations the dashboard needs from the remote music API.
///
/// Every call takes the bearer token explicitly; nothing is cached, retried
/// or refreshed here.
#[async_trait]
pub trait MusicApi: Send + Sync {
    async fn current_user(&self, token: &str) -> Result<UserProfile, AppError>;

    async fn current_user_top_tracks(&self, token: &str, limit: u32)
        -> Result<Vec<Track>, AppError>;

    async fn artist(&self, token: &str, artist_id: &str) -> Result<Artist, AppError>;

    /// The artist object exactly as the API returned it.
    async fn artist_json(&self, token: &str, artist_id: &str)
        -> Result<serde_json::Value, AppError>;

    async fn artist_top_tracks(&self, token: &str, artist_id: &str)
        -> Result<Vec<Track>, AppError>;

    /// Best match for a free-text artist name, or `None`.
    async fn search_artist(&self, token: &str, query: &str) -> Result<Option<Artist>, AppError>;
}

/// Spotify Web API client.
pub struct SpotifyClient {
    base_url: String,
    market: String,
    http: reqwest::Client,
}

impl SpotifyClient {
    pub fn new(base_url: String, market: String) -> Self {
        Self {
            base_url,
            market,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.market.clone())
    }

    /// `base_url` plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(format!("Invalid SPOTIFY_API_URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("SPOTIFY_API_URL cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "Spotify API request");

        let resp = self
            .http
            .get(url.clone())
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::remote(status, error_message(status, &body)));
        }

        resp.json::<T>().await.map_err(|e| AppError::RemoteApi {
            status: Some(status.as_u16()),
            message: format!("Failed to parse response from {}: {e}", url.path()),
        })
    }
}

#[async_trait]
impl MusicApi for SpotifyClient {
    async fn current_user(&self, token: &str) -> Result<UserProfile, AppError> {
        self.get_json(token, &["me"], &[]).await
    }

    async fn current_user_top_tracks(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<Track>, AppError> {
        let limit = limit.to_string();
        let page: Paging<Track> = self
            .get_json(token, &["me", "top", "tracks"], &[("limit", limit.as_str())])
            .await?;
        Ok(page.items)
    }

    async fn artist(&self, token: &str, artist_id: &str) -> Result<Artist, AppError> {
        self.get_json(token, &["artists", artist_id], &[]).await
    }

    async fn artist_json(
        &self,
        token: &str,
        artist_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        self.get_json(token, &["artists", artist_id], &[]).await
    }

    async fn artist_top_tracks(
        &self,
        token: &str,
        artist_id: &str,
    ) -> Result<Vec<Track>, AppError> {
        let top: TopTracks = self
            .get_json(
                token,
                &["artists", artist_id, "top-tracks"],
                &[("market", self.market.as_str())],
            )
            .await?;
        Ok(top.tracks)
    }

    async fn search_artist(&self, token: &str, query: &str) -> Result<Option<Artist>, AppError> {
        let q = format!("artist:{query}");
        let result: ArtistSearch = self
            .get_json(
                token,
                &["search"],
                &[("q", q.as_str()), ("type", "artist"), ("limit", "1")],
            )
            .await?;
        Ok(result.artists.and_then(|p| p.items.into_iter().next()))
    }
}

/// Spotify's own message if the body carries one, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) if !err.error.message.is_empty() => err.error.message,
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}
