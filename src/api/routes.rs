//! Route handlers for the local dashboard.
//!
//! Handlers load the credential through the OAuth flow, call the music API
//! and render HTML. Remote failures degrade the page instead of surfacing as
//! server errors; only the callback (400) and the unauthenticated detail and
//! JSON routes (401) report errors explicitly.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::pages;
use crate::auth::FlowState;
use crate::config::DashboardMode;
use crate::error::AppError;
use crate::spotify::{Artist, Track};
use crate::SharedState;

const PROFILE_TOP_TRACKS: u32 = 5;

pub fn dashboard_router(state: SharedState) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/login_spotify", get(login_spotify))
        .route("/spotify_callback", get(spotify_callback))
        .route("/logout", get(logout))
        .route("/artist_stats/{artist_id}", get(artist_stats))
        .route("/api/spotify/artist/{artist_id}", get(api_artist))
        .route("/status", get(status));

    if state.config.dashboard_mode == DashboardMode::Search {
        router = router.route("/search", get(search_artist));
    }

    router.with_state(state)
}

/// 302 Found, matching what browsers and the provider redirect expect.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

// =============================================================================
// Health
// =============================================================================

async fn status(State(state): State<SharedState>) -> impl IntoResponse {
    let auth = state.flow.status().await;
    Json(json!({
        "status": "ok",
        "service": "spotify-stats",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": state.config.dashboard_mode.as_str(),
        "authenticated": auth == FlowState::Authenticated,
        "auth_state": auth,
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

/// GET / — home page for the configured dashboard mode.
async fn index(State(state): State<SharedState>) -> Html<String> {
    let mode = state.config.dashboard_mode;
    let connect = || Html(pages::connect_page(mode, state.flow.provider_name()));

    let Some(credential) = state.flow.current_credential().await else {
        return connect();
    };
    let token = credential.access_token.as_str();

    let profile = match state.api.current_user(token).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Error fetching Spotify user: {e}");
            return connect();
        }
    };

    match mode {
        DashboardMode::Profile => {
            let top_tracks = state
                .api
                .current_user_top_tracks(token, PROFILE_TOP_TRACKS)
                .await
                .unwrap_or_else(|e| {
                    warn!("Error fetching top tracks: {e}");
                    Vec::new()
                });
            Html(pages::profile_page(&profile, &top_tracks))
        }
        DashboardMode::Artist => {
            let featured = featured_artist(&state, token, profile.name()).await;
            let featured_ref = featured
                .as_ref()
                .map(|(artist, tracks)| (artist, tracks.as_slice()));
            Html(pages::artist_dashboard(profile.name(), featured_ref))
        }
        DashboardMode::Search => Html(pages::search_dashboard(&profile)),
    }
}

/// The configured artist, or the best search match for the user's own name.
async fn featured_artist(
    state: &SharedState,
    token: &str,
    user_name: &str,
) -> Option<(Artist, Vec<Track>)> {
    let artist = match &state.config.artist_id {
        Some(id) => state.api.artist(token, id).await,
        None => state
            .api
            .search_artist(token, user_name)
            .await
            .and_then(|found| found.ok_or_else(|| AppError::NotFound("artist".into()))),
    };

    let artist = match artist {
        Ok(artist) => artist,
        Err(AppError::NotFound(_)) => return None,
        Err(e) => {
            warn!("Error fetching artist data: {e}");
            return None;
        }
    };

    let tracks = state
        .api
        .artist_top_tracks(token, &artist.id)
        .await
        .unwrap_or_else(|e| {
            warn!(artist_id = %artist.id, "Error fetching artist top tracks: {e}");
            Vec::new()
        });

    Some((artist, tracks))
}

// =============================================================================
// OAuth
// =============================================================================

/// GET /login_spotify — redirect to the provider authorization page.
async fn login_spotify(State(state): State<SharedState>) -> Response {
    match state.flow.begin_login() {
        Ok(url) => found(&url),
        Err(e) => {
            warn!("Could not start login: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")).into_response()
        }
    }
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    /// Set by the provider when the user denies access.
    error: Option<String>,
}

/// GET /spotify_callback — exchange the code, then back to the dashboard.
async fn spotify_callback(
    State(state): State<SharedState>,
    Query(q): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = &q.error {
        info!(%error, "Provider returned an authorization error");
    }

    match state
        .flow
        .handle_callback(q.code.as_deref(), q.state.as_deref())
        .await
    {
        Ok(_) => found("/"),
        Err(AppError::Authorization(msg)) => {
            warn!("Authorization failed: {msg}");
            (StatusCode::BAD_REQUEST, format!("Error: {msg}")).into_response()
        }
        Err(e) => {
            warn!("Could not complete login: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}")).into_response()
        }
    }
}

/// GET /logout — forget the credential, then back to the dashboard.
async fn logout(State(state): State<SharedState>) -> Response {
    if let Err(e) = state.flow.logout().await {
        warn!("Logout failed to clear credential: {e}");
    }
    found("/")
}

// =============================================================================
// Artists
// =============================================================================

/// GET /artist_stats/{artist_id} — artist detail page.
async fn artist_stats(
    State(state): State<SharedState>,
    Path(artist_id): Path<String>,
) -> Response {
    let Some(credential) = state.flow.current_credential().await else {
        return (
            StatusCode::UNAUTHORIZED,
            "You must connect to Spotify first.",
        )
            .into_response();
    };
    let token = credential.access_token.as_str();

    let artist = match state.api.artist(token, &artist_id).await {
        Ok(artist) => artist,
        Err(e) => {
            warn!(%artist_id, "Error fetching artist: {e}");
            return Html(pages::artist_unavailable_page(&artist_id)).into_response();
        }
    };

    let top_tracks = state
        .api
        .artist_top_tracks(token, &artist_id)
        .await
        .unwrap_or_else(|e| {
            warn!(%artist_id, "Error fetching artist top tracks: {e}");
            Vec::new()
        });

    Html(pages::artist_stats_page(&artist, &top_tracks)).into_response()
}

#[derive(Deserialize)]
struct SearchQuery {
    artist_name: Option<String>,
}

/// GET /search?artist_name= — resolve a name to an artist id (search mode only).
async fn search_artist(
    State(state): State<SharedState>,
    Query(q): Query<SearchQuery>,
) -> Response {
    let Some(credential) = state.flow.current_credential().await else {
        return found("/");
    };

    let name = q.artist_name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return found("/");
    }

    match state
        .api
        .search_artist(&credential.access_token, name)
        .await
    {
        Ok(Some(artist)) => found(&format!("/artist_stats/{}", artist.id)),
        Ok(None) => Html(pages::no_artist_found_page(name)).into_response(),
        Err(e) => {
            warn!(query = %name, "Artist search failed: {e}");
            Html(pages::search_failed_page(name)).into_response()
        }
    }
}

/// GET /api/spotify/artist/{artist_id} — the remote artist object, untouched.
async fn api_artist(
    State(state): State<SharedState>,
    Path(artist_id): Path<String>,
) -> Response {
    let Some(credential) = state.flow.current_credential().await else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "not logged in" })),
        )
            .into_response();
    };

    match state
        .api
        .artist_json(&credential.access_token, &artist_id)
        .await
    {
        Ok(artist) => Json(artist).into_response(),
        Err(e) => {
            warn!(%artist_id, "Error fetching artist: {e}");
            e.into_response()
        }
    }
}
