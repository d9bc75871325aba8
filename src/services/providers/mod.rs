/// External collaborator abstractions
///
/// The pipeline never talks to a network API directly. Each data source sits
/// behind one of these traits, so the core only ever sees already-parsed
/// values and tests can swap in mocks.
use crate::{
    error::{AppError, AppResult},
    models::{EvidenceSet, Playlist, PlaylistInfo, RawPost, Seed, Suggestion, Track},
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod openai;
pub mod reddit;
pub mod spotify;

/// Music catalog: playlist fetch and track search
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch a playlist and its tracks in playlist order
    ///
    /// Accepts a playlist URL, URI or bare ID.
    async fn fetch_playlist(&self, playlist_ref: &str) -> AppResult<Playlist>;

    /// Look up the best catalog match for a title/artist pair
    ///
    /// The match policy is the provider's; `Ok(None)` means no match.
    async fn search_track(&self, title: &str, artist: &str) -> AppResult<Option<Track>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Parameters for one community search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityQuery {
    pub subreddit: String,
    pub query: String,
    pub max_posts: usize,
    pub max_comments: usize,
}

/// Community text source (post and comment search)
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CommunityProvider: Send + Sync {
    /// Search posts and fetch their comments
    ///
    /// Posts come back in the provider's relevance order; comments in thread order.
    async fn search_posts(&self, query: &CommunityQuery) -> AppResult<Vec<RawPost>>;

    fn name(&self) -> &'static str;
}

/// Everything the suggestion generator gets to see
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    pub playlist: PlaylistInfo,
    /// Track seeds in rank order
    pub top_tracks: Vec<Seed>,
    /// Artist seeds in rank order
    pub top_artists: Vec<Seed>,
    pub evidence: EvidenceSet,
    pub subreddit: String,
    pub num_recommendations: usize,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Language-model suggestion source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Produce song suggestions, nominally `context.num_recommendations` of them
    ///
    /// Unparseable model output is an error here; callers only see parsed values.
    async fn generate(&self, context: &GenerationContext) -> AppResult<Vec<Suggestion>>;

    fn name(&self) -> &'static str;
}

/// Turn a non-2xx response into an `ExternalApi` error carrying status and body
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    provider: &str,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::ExternalApi(format!(
        "{} API returned status {}: {}",
        provider, status, body
    )))
}

/// Longest subreddit name Reddit accepts
const MAX_SUBREDDIT_LEN: usize = 21;

/// Checks a subreddit name before it is placed into a request path
///
/// Only ASCII letters, digits and underscores are allowed.
pub fn validate_subreddit_name(name: &str) -> AppResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_SUBREDDIT_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Invalid subreddit name: '{}'",
            name
        )))
    }
}

/// Tokens are treated as expired this long before the server says so
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token endpoint response (Spotify and Reddit share the shape)
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Bearer token shared between clones of a provider
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenCache {
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenCache {
    /// Returns the cached token, or runs `refresh` and caches its result
    ///
    /// The write lock is held while refreshing so concurrent callers wait for
    /// one request instead of each issuing their own.
    pub(crate) async fn get_or_refresh<F, Fut>(&self, refresh: F) -> AppResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<TokenResponse>>,
    {
        if let Some(value) = Self::valid(self.token.read().await.as_ref()) {
            return Ok(value);
        }

        let mut guard = self.token.write().await;
        if let Some(value) = Self::valid(guard.as_ref()) {
            return Ok(value);
        }

        let response = refresh().await?;
        let expires_at =
            Utc::now() + Duration::seconds(response.expires_in - TOKEN_EXPIRY_MARGIN_SECS);
        tracing::debug!(expires_at = %expires_at, "Access token refreshed");

        *guard = Some(AccessToken {
            value: response.access_token.clone(),
            expires_at,
        });

        Ok(response.access_token)
    }

    fn valid(token: Option<&AccessToken>) -> Option<String> {
        token
            .filter(|t| t.expires_at > Utc::now())
            .map(|t| t.value.clone())
    }
}
