//! Shared fakes for unit and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::config::Config;
use crate::error::AppError;
use crate::providers::{OAuthProvider, TokenSet};
use crate::spotify::{Artist, Followers, Image, MusicApi, SimpleArtist, Track, UserProfile};
use crate::store::{Credential, CredentialStore};

/// Authorization code the stub provider accepts.
pub const GOOD_CODE: &str = "good-code";

pub fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "SPOTIFY_CLIENT_ID" => "test-client",
            "SPOTIFY_CLIENT_SECRET" => "test-secret",
            "SESSION_SECRET" => "test-session-secret",
            "OPEN_WINDOW" => "false",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test config")
}

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}

// ── Credential store ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<Credential>>,
    fail: bool,
    saves: AtomicUsize,
    loads: AtomicUsize,
    clears: AtomicUsize,
}

impl MemoryStore {
    pub fn with(credential: Credential) -> Self {
        Self {
            record: Mutex::new(Some(credential)),
            ..Default::default()
        }
    }

    /// Every operation fails with a database error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> Option<Credential> {
        self.record.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
            + self.loads.load(Ordering::SeqCst)
            + self.clears.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::Database("disk I/O error".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn save(&self, credential: &Credential) -> Result<(), AppError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        *self.record.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, AppError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.record.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}

// ── OAuth provider ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ProviderCalls {
    exchanges: AtomicUsize,
    refreshes: AtomicUsize,
}

impl ProviderCalls {
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

/// Accepts [`GOOD_CODE`]; refreshes succeed unless built with `rejecting()`.
#[derive(Default)]
pub struct StubProvider {
    calls: Arc<ProviderCalls>,
    reject_refresh: bool,
}

impl StubProvider {
    pub fn rejecting() -> Self {
        Self {
            reject_refresh: true,
            ..Default::default()
        }
    }

    pub fn counters(&self) -> Arc<ProviderCalls> {
        self.calls.clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.calls.refreshes()
    }
}

#[async_trait]
impl OAuthProvider for StubProvider {
    fn id(&self) -> &str {
        "spotify"
    }

    fn display_name(&self) -> &str {
        "Spotify"
    }

    fn auth_url(&self, scopes: &[String], state: &str, redirect_uri: &str) -> String {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", "test-client")
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &scopes.join(" "))
            .append_pair("state", state)
            .finish();
        format!("https://accounts.example.test/authorize?{query}")
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<TokenSet, AppError> {
        self.calls.exchanges.fetch_add(1, Ordering::SeqCst);
        if code != GOOD_CODE {
            return Err(AppError::Authorization(
                "invalid_grant (Invalid authorization code)".into(),
            ));
        }
        Ok(TokenSet {
            access_token: "access-from-code".into(),
            refresh_token: Some("refresh-from-code".into()),
            token_type: "Bearer".into(),
            expires_in: Some(3600),
            scope: None,
        })
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenSet, AppError> {
        self.calls.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.reject_refresh {
            return Err(AppError::RefreshFailed("invalid_grant (Refresh token revoked)".into()));
        }
        Ok(TokenSet {
            access_token: "refreshed-access".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_in: Some(3600),
            scope: None,
        })
    }
}

// ── Music API ────────────────────────────────────────────────────────────────

/// Canned Spotify data. `failing()` answers every call with a 401.
#[derive(Clone)]
pub struct StubApi {
    pub profile: UserProfile,
    pub artists: Vec<Artist>,
    pub fail: bool,
}

impl Default for StubApi {
    fn default() -> Self {
        Self {
            profile: UserProfile {
                id: "wizzler".into(),
                display_name: Some("Wizzler".into()),
                images: vec![Image {
                    url: "https://i.scdn.co/image/wizzler".into(),
                    ..Default::default()
                }],
                followers: Followers { total: 42 },
                ..Default::default()
            },
            artists: vec![sample_artist()],
            fail: false,
        }
    }
}

impl StubApi {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::remote(
                reqwest::StatusCode::UNAUTHORIZED,
                "The access token expired",
            ));
        }
        Ok(())
    }
}

pub fn sample_artist() -> Artist {
    Artist {
        id: "4Z8W4fKeB5YxbusRsdQVPb".into(),
        name: "Radiohead".into(),
        popularity: 79,
        genres: vec!["art rock".into(), "alternative rock".into()],
        followers: Followers { total: 9_876_543 },
        ..Default::default()
    }
}

fn track(name: &str, artist: &str, popularity: u32) -> Track {
    Track {
        id: None,
        name: name.into(),
        popularity,
        artists: vec![SimpleArtist {
            id: None,
            name: artist.into(),
        }],
    }
}

#[async_trait]
impl MusicApi for StubApi {
    async fn current_user(&self, _token: &str) -> Result<UserProfile, AppError> {
        self.check()?;
        Ok(self.profile.clone())
    }

    async fn current_user_top_tracks(
        &self,
        _token: &str,
        limit: u32,
    ) -> Result<Vec<Track>, AppError> {
        self.check()?;
        let tracks = vec![
            track("Everything In Its Right Place", "Radiohead", 70),
            track("Teardrop", "Massive Attack", 75),
        ];
        Ok(tracks.into_iter().take(limit as usize).collect())
    }

    async fn artist(&self, _token: &str, artist_id: &str) -> Result<Artist, AppError> {
        self.check()?;
        self.artists
            .iter()
            .find(|a| a.id == artist_id)
            .cloned()
            .ok_or_else(|| AppError::remote(reqwest::StatusCode::NOT_FOUND, "Resource not found"))
    }

    async fn artist_json(
        &self,
        token: &str,
        artist_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        let artist = self.artist(token, artist_id).await?;
        Ok(serde_json::json!({
            "id": artist.id,
            "name": artist.name,
            "followers": {"href": null, "total": artist.followers.total},
            "uri": format!("spotify:artist:{}", artist.id),
            "type": "artist",
        }))
    }

    async fn artist_top_tracks(
        &self,
        _token: &str,
        artist_id: &str,
    ) -> Result<Vec<Track>, AppError> {
        let artist = self.artist("", artist_id).await?;
        Ok(vec![
            track("Creep", &artist.name, 88),
            track("No Surprises", &artist.name, 83),
        ])
    }

    async fn search_artist(&self, _token: &str, query: &str) -> Result<Option<Artist>, AppError> {
        self.check()?;
        Ok(self
            .artists
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(query))
            .cloned())
    }
}
