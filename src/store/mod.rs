//! Credential store — the single cached Spotify token record.

pub mod db;
pub mod refresh;

pub use db::{Credential, CredentialStore, SqliteCredentialStore};
pub use refresh::refresh_if_expired;
