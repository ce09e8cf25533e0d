use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_SCOPES: &str = "user-read-private user-read-email user-top-read";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEV_SESSION_SECRET: &str = "dev_secret";

/// Which dashboard the home page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    /// The logged-in user's own profile and top tracks.
    Profile,
    /// A fixed artist (`ARTIST_ID`), falling back to a search by display name.
    Artist,
    /// A search form resolving artist names to detail pages.
    Search,
}

impl DashboardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardMode::Profile => "profile",
            DashboardMode::Artist => "artist",
            DashboardMode::Search => "search",
        }
    }

    /// Page/window title for this dashboard.
    pub fn title(&self) -> &'static str {
        match self {
            DashboardMode::Profile => "Spotify Stats App",
            DashboardMode::Artist => "Spotify Artist Stats App",
            DashboardMode::Search => "Spotify Artist Search App",
        }
    }
}

impl fmt::Display for DashboardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(DashboardMode::Profile),
            "artist" => Ok(DashboardMode::Artist),
            "search" => Ok(DashboardMode::Search),
            other => bail!("unknown dashboard mode '{other}' (expected profile, artist or search)"),
        }
    }
}

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,
    pub dashboard_mode: DashboardMode,

    // ── Storage ─────────────────────────────────────────────────────────
    pub database_url: String,

    // ── Spotify OAuth ───────────────────────────────────────────────────
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// HMAC key material for the OAuth `state` parameter.
    pub session_secret: String,
    /// Refresh an expired access token before use instead of requiring a relogin.
    pub auto_refresh: bool,

    // ── Spotify Web API ─────────────────────────────────────────────────
    pub accounts_url: String,
    pub api_url: String,
    pub artist_id: Option<String>,
    pub market: String,

    // ── Shell ───────────────────────────────────────────────────────────
    pub open_window: bool,
    pub startup_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = get("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("Invalid PORT")?;

        let artist_id = get("ARTIST_ID");
        let dashboard_mode = match get("DASHBOARD_MODE") {
            Some(raw) => raw.parse().context("Invalid DASHBOARD_MODE")?,
            None if artist_id.is_some() => DashboardMode::Artist,
            None => DashboardMode::Profile,
        };

        let scopes = get("SPOTIFY_SCOPES")
            .unwrap_or_else(|| DEFAULT_SCOPES.into())
            .split(|c: char| c == ' ' || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Config {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
            dashboard_mode,

            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://spotify_users.sqlite".into()),

            client_id: get("SPOTIFY_CLIENT_ID").unwrap_or_default(),
            client_secret: get("SPOTIFY_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: get("REDIRECT_URI")
                .unwrap_or_else(|| format!("http://localhost:{port}/spotify_callback")),
            scopes,
            session_secret: get("SESSION_SECRET")
                .or_else(|| get("FLASK_SECRET"))
                .unwrap_or_else(|| DEV_SESSION_SECRET.into()),
            auto_refresh: parse_bool(get("TOKEN_AUTO_REFRESH"), true)
                .context("Invalid TOKEN_AUTO_REFRESH")?,

            accounts_url: get("SPOTIFY_ACCOUNTS_URL")
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.into())
                .trim_end_matches('/')
                .to_string(),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.into())
                .trim_end_matches('/')
                .to_string(),
            artist_id,
            market: get("SPOTIFY_MARKET").unwrap_or_else(|| "US".into()),

            open_window: parse_bool(get("OPEN_WINDOW"), true).context("Invalid OPEN_WINDOW")?,
            startup_delay: Duration::from_millis(
                get("STARTUP_DELAY_MS")
                    .unwrap_or_else(|| "1000".into())
                    .parse()
                    .context("Invalid STARTUP_DELAY_MS")?,
            ),
        })
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL the shell window is pointed at.
    pub fn local_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "localhost",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }

    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn uses_dev_session_secret(&self) -> bool {
        self.session_secret == DEV_SESSION_SECRET
    }
}

fn parse_bool(raw: Option<String>, default: bool) -> Result<bool> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.redirect_uri, "http://localhost:8080/spotify_callback");
        assert_eq!(cfg.dashboard_mode, DashboardMode::Profile);
        assert_eq!(
            cfg.scopes,
            vec!["user-read-private", "user-read-email", "user-top-read"]
        );
        assert_eq!(cfg.market, "US");
        assert!(cfg.auto_refresh);
        assert!(cfg.open_window);
        assert_eq!(cfg.startup_delay, Duration::from_secs(1));
        assert!(cfg.uses_dev_session_secret());
        assert!(!cfg.has_client_credentials());
    }

    #[test]
    fn artist_id_selects_artist_mode() {
        let cfg = config_from(&[("ARTIST_ID", "0OdUWJ0sBjDrqHygGUXeCF")]).unwrap();
        assert_eq!(cfg.dashboard_mode, DashboardMode::Artist);
        assert_eq!(cfg.artist_id.as_deref(), Some("0OdUWJ0sBjDrqHygGUXeCF"));
    }

    #[test]
    fn explicit_mode_wins() {
        let cfg = config_from(&[("ARTIST_ID", "abc"), ("DASHBOARD_MODE", "Search")]).unwrap();
        assert_eq!(cfg.dashboard_mode, DashboardMode::Search);
    }

    #[test]
    fn flask_secret_is_accepted_as_session_secret() {
        let cfg = config_from(&[("FLASK_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.session_secret, "s3cret");
        assert!(!cfg.uses_dev_session_secret());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("DASHBOARD_MODE", "charts")]).is_err());
        assert!(config_from(&[("TOKEN_AUTO_REFRESH", "maybe")]).is_err());
    }

    #[test]
    fn trailing_slashes_trimmed_and_local_url() {
        let cfg = config_from(&[
            ("SPOTIFY_API_URL", "http://127.0.0.1:9000/v1/"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9090"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "http://127.0.0.1:9000/v1");
        assert_eq!(cfg.local_url(), "http://localhost:9090");
    }
}
