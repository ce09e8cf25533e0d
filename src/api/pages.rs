//! HTML rendering for the dashboard pages.
//!
//! Pages are plain `format!` templates over the typed API models; every
//! remote string goes through [`html_escape`].

use crate::config::DashboardMode;
use crate::spotify::{Artist, Track, UserProfile};

const STYLE: &str = "font-family:sans-serif; padding:20px;";

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="{STYLE}">
{body}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Logged-out view: a single connect link.
pub fn connect_page(mode: DashboardMode, provider: &str) -> String {
    let heading = match mode {
        DashboardMode::Profile => "Spotify Stats App",
        DashboardMode::Artist | DashboardMode::Search => "Spotify Artist Dashboard",
    };
    let link = match mode {
        DashboardMode::Profile => format!("Connect to {}", html_escape(provider)),
        _ => format!("Connect {}", html_escape(provider)),
    };
    layout(
        mode.title(),
        &format!(
            r#"<h2>{heading}</h2>
<a href="/login_spotify">{link}</a>"#
        ),
    )
}

pub fn profile_page(profile: &UserProfile, top_tracks: &[Track]) -> String {
    let profile_link = profile
        .external_urls
        .spotify
        .as_deref()
        .map(|url| {
            format!(
                r#"<p><a href="{}" target="_blank">View Profile on Spotify</a></p>"#,
                html_escape(url)
            )
        })
        .unwrap_or_default();

    let tracks: String = top_tracks
        .iter()
        .map(|t| match t.primary_artist() {
            Some(artist) => format!(
                "<li>{} — {}</li>\n",
                html_escape(&t.name),
                html_escape(artist)
            ),
            None => format!("<li>{}</li>\n", html_escape(&t.name)),
        })
        .collect();

    layout(
        DashboardMode::Profile.title(),
        &format!(
            r#"<h2>Spotify Stats App</h2>
<p><b>Logged in as:</b> {name}</p>
{image}<br><br>
<p>Followers: {followers}</p>
{profile_link}
<hr/>
<h3>Your Top Tracks:</h3>
<ul>
{tracks}</ul>
<hr/>
<a href="/logout">Log out</a>"#,
            name = html_escape(profile.name()),
            image = image_tag(profile.image_url(), 120),
            followers = group_thousands(profile.followers.total),
        ),
    )
}

/// Artist-mode home page. `artist` is `None` when neither `ARTIST_ID` nor a
/// search by the user's display name produced an artist.
pub fn artist_dashboard(user_name: &str, artist: Option<(&Artist, &[Track])>) -> String {
    let body = match artist {
        Some((artist, tracks)) => format!(
            r#"<h2>Spotify Artist Dashboard</h2>
<h3>Welcome, {user}</h3>
{image}<br><br>
<p><b>Artist:</b> {name}</p>
{details}
<hr/>
<h3>Top Tracks:</h3>
<ul>
{tracks}</ul>
<hr/>
<a href="/logout">Log out</a>"#,
            user = html_escape(user_name),
            image = image_tag(artist.image_url(), 150),
            name = html_escape(&artist.name),
            details = artist_details(artist, "View on Spotify"),
            tracks = track_popularity_list(tracks),
        ),
        None => format!(
            r#"<h2>Spotify Artist Dashboard</h2>
<p>Welcome, {user}. No artist profile found for your name.</p>
<p>You can manually view an artist by adding their ID to the URL:</p>
<p><code>/artist_stats/&lt;artist_id&gt;</code></p>
<a href="/logout">Log out</a>"#,
            user = html_escape(user_name),
        ),
    };
    layout(DashboardMode::Artist.title(), &body)
}

/// Search-mode home page: greeting plus the artist search form.
pub fn search_dashboard(profile: &UserProfile) -> String {
    layout(
        DashboardMode::Search.title(),
        &format!(
            r#"<h2>Spotify Artist Dashboard</h2>
<p>Welcome, <b>{name}</b>!</p>
{image}<br>
<p><a href="/logout">Log out</a></p>
<hr/>
<h3>Search Artist:</h3>
<form action="/search" method="get">
    <input type="text" name="artist_name" placeholder="Enter artist name" required style="padding:6px;width:250px;">
    <input type="submit" value="Search" style="padding:6px;">
</form>
<p>or view directly by ID: <code>/artist_stats/&lt;artist_id&gt;</code></p>"#,
            name = html_escape(profile.name()),
            image = image_tag(profile.image_url(), 120),
        ),
    )
}

/// `/artist_stats/{id}` detail page.
pub fn artist_stats_page(artist: &Artist, top_tracks: &[Track]) -> String {
    layout(
        &format!("{} - Stats", artist.name),
        &format!(
            r#"<h2>{name}</h2>
{image}<br>
{details}
<hr/>
<h3>Top Tracks:</h3>
<ul>
{tracks}</ul>
<a href="/">⬅ Back</a>"#,
            name = html_escape(&artist.name),
            image = image_tag(artist.image_url(), 150),
            details = artist_details(artist, "Open on Spotify"),
            tracks = track_popularity_list(top_tracks),
        ),
    )
}

/// Degraded detail page when the artist could not be fetched.
pub fn artist_unavailable_page(artist_id: &str) -> String {
    layout(
        "Artist unavailable",
        &format!(
            r#"<p>Could not load artist data for <code>{}</code>. Your Spotify session may have expired.</p>
<p><a href="/login_spotify">Reconnect Spotify</a></p>
<a href="/">⬅ Back</a>"#,
            html_escape(artist_id)
        ),
    )
}

pub fn no_artist_found_page(query: &str) -> String {
    layout(
        "No artist found",
        &format!(
            r#"<p>No artist found for '{}'.</p><a href='/'>⬅ Back</a>"#,
            html_escape(query)
        ),
    )
}

pub fn search_failed_page(query: &str) -> String {
    layout(
        "Search failed",
        &format!(
            r#"<p>Searching for '{}' failed. Your Spotify session may have expired.</p>
<p><a href="/login_spotify">Reconnect Spotify</a></p>
<a href='/'>⬅ Back</a>"#,
            html_escape(query)
        ),
    )
}

fn artist_details(artist: &Artist, link_label: &str) -> String {
    let link = artist
        .external_urls
        .spotify
        .as_deref()
        .map(|url| {
            format!(
                r#"<p><a href="{}" target="_blank">{link_label}</a></p>"#,
                html_escape(url)
            )
        })
        .unwrap_or_default();

    let genres = if artist.genres.is_empty() {
        "—".to_string()
    } else {
        html_escape(&artist.genres.join(", "))
    };

    format!(
        r#"<p><b>Followers:</b> {followers}</p>
<p><b>Popularity:</b> {popularity} / 100</p>
<p><b>Genres:</b> {genres}</p>
{link}"#,
        followers = group_thousands(artist.followers.total),
        popularity = artist.popularity,
    )
}

fn track_popularity_list(tracks: &[Track]) -> String {
    tracks
        .iter()
        .map(|t| {
            format!(
                "<li>{} — Popularity: {}</li>\n",
                html_escape(&t.name),
                t.popularity
            )
        })
        .collect()
}

fn image_tag(url: Option<&str>, width: u32) -> String {
    match url {
        Some(url) => format!(r#"<img src="{}" width="{width}"/>"#, html_escape(url)),
        None => String::new(),
    }
}

/// `1234567` → `1,234,567`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Simple HTML escape function
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
