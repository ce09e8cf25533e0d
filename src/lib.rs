pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod providers;
pub mod shell;
pub mod spotify;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::{Config, DashboardMode};
pub use error::AppError;

use std::sync::Arc;

/// Shared application state passed to all handlers.
pub struct AppState {
    pub config: Config,
    pub flow: auth::OAuthFlow,
    pub api: Box<dyn spotify::MusicApi>,
}

impl AppState {
    pub fn new(config: Config, flow: auth::OAuthFlow, api: Box<dyn spotify::MusicApi>) -> Self {
        Self { config, flow, api }
    }
}

pub type SharedState = Arc<AppState>;
