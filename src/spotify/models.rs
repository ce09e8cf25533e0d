//! Typed views of the Spotify Web API responses the dashboard renders.
//!
//! Every field the pages read but Spotify may omit (images, genres,
//! followers, popularity, profile links) has an explicit default.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// `GET /me`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl UserProfile {
    /// Display name, falling back to the account id.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn image_url(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

/// `GET /artists/{id}` and search results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl Artist {
    pub fn image_url(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

/// Artist reference embedded in a track.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimpleArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }
}

/// Envelope of `GET /artists/{id}/top-tracks`.
#[derive(Debug, Deserialize)]
pub(crate) struct TopTracks {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Generic paging object (`/me/top/tracks`, search results).
#[derive(Debug, Deserialize)]
pub(crate) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Envelope of `GET /search?type=artist`.
#[derive(Debug, Deserialize)]
pub(crate) struct ArtistSearch {
    pub artists: Option<Paging<Artist>>,
}

/// Spotify's regular error object: `{"error": {"status": 401, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
}

fn first_image(images: &[Image]) -> Option<&str> {
    images
        .first()
        .map(|i| i.url.as_str())
        .filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_with_missing_optional_fields() {
        let artist: Artist =
            serde_json::from_str(r#"{"id": "a1", "name": "Nobody Yet"}"#).unwrap();
        assert!(artist.genres.is_empty());
        assert_eq!(artist.image_url(), None);
        assert_eq!(artist.followers.total, 0);
        assert_eq!(artist.popularity, 0);
        assert_eq!(artist.external_urls.spotify, None);
    }

    #[test]
    fn artist_full_payload() {
        let artist: Artist = serde_json::from_value(serde_json::json!({
            "id": "0OdUWJ0sBjDrqHygGUXeCF",
            "name": "Band of Horses",
            "popularity": 59,
            "genres": ["indie folk", "indie rock"],
            "images": [{"url": "https://i.scdn.co/image/big", "width": 640, "height": 640}],
            "followers": {"href": null, "total": 1234567},
            "external_urls": {"spotify": "https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF"},
            "type": "artist",
            "uri": "spotify:artist:0OdUWJ0sBjDrqHygGUXeCF"
        }))
        .unwrap();
        assert_eq!(artist.image_url(), Some("https://i.scdn.co/image/big"));
        assert_eq!(artist.followers.total, 1_234_567);
        assert_eq!(artist.genres, vec!["indie folk", "indie rock"]);
    }

    #[test]
    fn profile_name_falls_back_to_id() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id": "wizzler", "display_name": null}"#).unwrap();
        assert_eq!(profile.name(), "wizzler");
        assert_eq!(profile.image_url(), None);
    }

    #[test]
    fn search_with_no_items() {
        let search: ArtistSearch =
            serde_json::from_str(r#"{"artists": {"items": [], "total": 0}}"#).unwrap();
        assert!(search.artists.unwrap().items.is_empty());
    }

    #[test]
    fn track_primary_artist() {
        let track: Track = serde_json::from_str(
            r#"{"name": "The Funeral", "popularity": 70, "artists": [{"name": "Band of Horses"}]}"#,
        )
        .unwrap();
        assert_eq!(track.primary_artist(), Some("Band of Horses"));

        let orphan: Track = serde_json::from_str(r#"{"name": "Untitled"}"#).unwrap();
        assert_eq!(orphan.primary_artist(), None);
    }
}
