//! HTTP surface of the dashboard.
//!
//! - `/`                           — mode-dependent home page
//! - `/login_spotify`              — start the OAuth flow
//! - `/spotify_callback`           — OAuth redirect target
//! - `/logout`                     — forget the stored credential
//! - `/artist_stats/{id}`          — artist detail page
//! - `/search`                     — artist lookup (search mode only)
//! - `/api/spotify/artist/{id}`    — artist as JSON
//! - `/status`                     — health check

pub mod pages;
pub mod routes;

use crate::SharedState;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    routes::dashboard_router(state).layer(TraceLayer::new_for_http())
}
