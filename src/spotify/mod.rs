//! Spotify Web API facade: typed models plus the authenticated client.

pub mod client;
pub mod models;

pub use client::{MusicApi, SpotifyClient};
pub use models::{Artist, ExternalUrls, Followers, Image, SimpleArtist, Track, UserProfile};
