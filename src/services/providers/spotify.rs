/// Spotify Web API provider
///
/// Uses the client-credentials flow, which is enough for public playlists
/// and catalog search. The access token is cached until shortly before it
/// expires and shared between clones of the provider.
///
/// API Flow:
/// 1. Token: POST {accounts}/api/token (basic auth, grant_type=client_credentials)
/// 2. Playlist: GET /playlists/{id}, then follow `tracks.next` pages
/// 3. Search: GET /search?q=track:{title} artist:{artist}&type=track&limit=1
use crate::{
    error::{AppError, AppResult},
    models::{
        track::{ApiPlaylist, ApiPlaylistItem, ApiPlaylistItems, ApiSearchResponse},
        Playlist, PlaylistInfo, Track,
    },
    services::providers::{ensure_success, CatalogProvider, TokenCache, TokenResponse},
};
use reqwest::Client as HttpClient;

const PROVIDER: &str = "spotify";

#[derive(Clone)]
pub struct SpotifyProvider {
    http_client: HttpClient,
    client_id: String,
    client_secret: String,
    api_url: String,
    accounts_url: String,
    token: TokenCache,
}

impl SpotifyProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        api_url: String,
        accounts_url: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            client_id,
            client_secret,
            api_url,
            accounts_url,
            token: TokenCache::default(),
        }
    }

    /// Returns a valid access token, requesting a new one if needed
    async fn access_token(&self) -> AppResult<String> {
        self.token
            .get_or_refresh(|| async move {
                let url = format!("{}/api/token", self.accounts_url);
                let response = self
                    .http_client
                    .post(&url)
                    .basic_auth(&self.client_id, Some(&self.client_secret))
                    .form(&[("grant_type", "client_credentials")])
                    .send()
                    .await?;
                let response = ensure_success(response, "Spotify accounts").await?;
                Ok(response.json::<TokenResponse>().await?)
            })
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let token = self.access_token().await?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        let response = ensure_success(response, "Spotify").await?;
        Ok(response.json().await?)
    }
}

/// Extracts the playlist ID from a share URL, a `spotify:playlist:` URI or a bare ID
pub fn parse_playlist_id(playlist_ref: &str) -> AppResult<String> {
    let trimmed = playlist_ref.trim();

    let candidate = if let Some(id) = trimmed.strip_prefix("spotify:playlist:") {
        id
    } else if let Some(idx) = trimmed.find("/playlist/") {
        let rest = &trimmed[idx + "/playlist/".len()..];
        rest.split(&['?', '/', '#'][..]).next().unwrap_or_default()
    } else {
        trimmed
    };

    if candidate.is_empty() || !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidInput(format!(
            "Not a Spotify playlist reference: '{}'",
            playlist_ref
        )));
    }

    Ok(candidate.to_string())
}

/// Keeps catalog tracks only: skips removed items, podcast episodes and local files
fn catalog_tracks(items: Vec<ApiPlaylistItem>) -> impl Iterator<Item = Track> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .filter(|track| track.item_type.as_deref().unwrap_or("track") == "track")
        .filter(|track| {
            track
                .uri
                .as_deref()
                .is_some_and(|uri| uri.starts_with("spotify:track:"))
        })
        .map(Track::from)
}

#[async_trait::async_trait]
impl CatalogProvider for SpotifyProvider {
    #[tracing::instrument(skip(self))]
    async fn fetch_playlist(&self, playlist_ref: &str) -> AppResult<Playlist> {
        let playlist_id = parse_playlist_id(playlist_ref)?;

        let url = format!("{}/playlists/{}", self.api_url, playlist_id);
        let playlist: ApiPlaylist = self
            .get_json(&url, &[("additional_types", "track")])
            .await?;

        let info = PlaylistInfo::from(&playlist);
        let mut tracks: Vec<Track> = catalog_tracks(playlist.tracks.items).collect();
        let mut next = playlist.tracks.next;

        while let Some(page_url) = next {
            let page: ApiPlaylistItems = self.get_json(&page_url, &[]).await?;
            tracks.extend(catalog_tracks(page.items));
            next = page.next;
        }

        tracing::info!(
            playlist = %info.name,
            total = info.total_tracks,
            tracks = tracks.len(),
            provider = PROVIDER,
            "Playlist fetched"
        );

        Ok(Playlist { info, tracks })
    }

    async fn search_track(&self, title: &str, artist: &str) -> AppResult<Option<Track>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search title cannot be empty".to_string(),
            ));
        }

        let query = format!("track:{} artist:{}", title, artist);
        let url = format!("{}/search", self.api_url);
        let results: ApiSearchResponse = self
            .get_json(&url, &[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .await?;

        let track = results.tracks.items.into_iter().next().map(Track::from);

        tracing::info!(
            query = %query,
            found = track.is_some(),
            provider = PROVIDER,
            "Track search completed"
        );

        Ok(track)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
