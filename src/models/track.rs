use serde::{Deserialize, Serialize};

/// A catalog track as fetched from Spotify. Never mutated after fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Catalog URI (e.g., "spotify:track:4uLU6hMCjMI75M1A2tKUQC")
    pub id: String,
    pub title: String,
    /// Credited artists, in credit order
    pub artists: Vec<String>,
    pub album: String,
    /// Catalog popularity, 0-100
    pub popularity: u8,
    pub duration_ms: u64,
    pub release_date: Option<String>,
    pub artwork_url: Option<String>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
}

impl Track {
    /// Creates a track with only the fields the ranking stages look at
    pub fn new(id: impl Into<String>, title: impl Into<String>, artists: Vec<String>, popularity: u8) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists,
            album: String::new(),
            popularity: popularity.min(100),
            duration_ms: 0,
            release_date: None,
            artwork_url: None,
            preview_url: None,
            external_url: None,
        }
    }

    /// Artist credit as displayed to users: "A, B"
    pub fn artist_names(&self) -> String {
        self.artists.join(", ")
    }

    /// Duration rendered as "m:ss"
    pub fn duration_readable(&self) -> String {
        let total_seconds = self.duration_ms / 1000;
        format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

/// Summary of a playlist, independent of its tracks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub total_tracks: usize,
    pub external_url: Option<String>,
}

/// A fetched playlist: summary plus tracks in playlist order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub info: PlaylistInfo,
    pub tracks: Vec<Track>,
}

// ============================================================================
// Spotify Web API Types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<ApiImage>,
}

/// Track object as returned by /playlists/{id}/tracks and /search
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTrack {
    #[serde(default)]
    pub uri: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    #[serde(default)]
    pub album: ApiAlbum,
    #[serde(default)]
    pub popularity: u8,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ApiExternalUrls,
    /// "track" or "episode"
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
}

impl From<ApiTrack> for Track {
    fn from(track: ApiTrack) -> Self {
        Track {
            id: track.uri.unwrap_or_default(),
            title: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album: track.album.name,
            popularity: track.popularity.min(100),
            duration_ms: track.duration_ms,
            release_date: track.album.release_date,
            // Spotify orders images widest first
            artwork_url: track.album.images.into_iter().next().map(|i| i.url),
            preview_url: track.preview_url,
            external_url: track.external_urls.spotify,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPlaylistItem {
    #[serde(default)]
    pub track: Option<ApiTrack>,
}

/// One page of playlist items
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPlaylistItems {
    #[serde(default)]
    pub items: Vec<ApiPlaylistItem>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOwner {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Response from GET /playlists/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<ApiOwner>,
    #[serde(default)]
    pub external_urls: ApiExternalUrls,
    pub tracks: ApiPlaylistItems,
}

impl From<&ApiPlaylist> for PlaylistInfo {
    fn from(playlist: &ApiPlaylist) -> Self {
        PlaylistInfo {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            description: playlist
                .description
                .clone()
                .filter(|d| !d.trim().is_empty()),
            owner: playlist.owner.as_ref().and_then(|o| o.display_name.clone()),
            total_tracks: playlist.tracks.total,
            external_url: playlist.external_urls.spotify.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiTrackPage {
    #[serde(default)]
    pub items: Vec<ApiTrack>,
}

/// Response from GET /search?type=track
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchResponse {
    pub tracks: ApiTrackPage,
}
