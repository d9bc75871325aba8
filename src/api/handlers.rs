use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{matched_tracks, unresolved_suggestions, Suggestion, Track},
    services::{PipelineSettings, RecommendationReport},
};

use super::{AppJson, AppState};

const SERVICE_NAME: &str = "RedditJams API";

// Request/Response types

/// Body of POST /api/recommendations; everything but the playlist is optional
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub playlist_url: String,
    pub subreddit_name: Option<String>,
    pub max_reddit_posts_per_query: Option<usize>,
    pub max_comments_per_post: Option<usize>,
    pub num_top_tracks: Option<usize>,
    pub num_top_artists: Option<usize>,
    pub gpt_model: Option<String>,
    pub gpt_temperature: Option<f32>,
    pub gpt_max_tokens: Option<u32>,
    pub num_recommendations: Option<usize>,
}

impl RecommendationRequest {
    /// Applies this request's overrides on top of the server defaults
    pub fn settings(&self, defaults: &PipelineSettings) -> PipelineSettings {
        PipelineSettings {
            subreddit_name: self
                .subreddit_name
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| defaults.subreddit_name.clone()),
            max_reddit_posts_per_query: self
                .max_reddit_posts_per_query
                .unwrap_or(defaults.max_reddit_posts_per_query),
            max_comments_per_post: self
                .max_comments_per_post
                .unwrap_or(defaults.max_comments_per_post),
            num_top_tracks: self.num_top_tracks.unwrap_or(defaults.num_top_tracks),
            num_top_artists: self.num_top_artists.unwrap_or(defaults.num_top_artists),
            num_recommendations: self
                .num_recommendations
                .unwrap_or(defaults.num_recommendations),
            gpt_model: self
                .gpt_model
                .clone()
                .unwrap_or_else(|| defaults.gpt_model.clone()),
            gpt_temperature: self.gpt_temperature.unwrap_or(defaults.gpt_temperature),
            gpt_max_tokens: self.gpt_max_tokens.unwrap_or(defaults.gpt_max_tokens),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub uri: String,
    pub name: String,
    pub artist: String,
    pub artists: Vec<String>,
    pub album: String,
    pub popularity: u8,
    pub duration_ms: u64,
    pub duration_readable: String,
    pub release_date: Option<String>,
    pub album_art: Option<String>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
}

impl From<&Track> for TrackResponse {
    fn from(track: &Track) -> Self {
        Self {
            uri: track.id.clone(),
            name: track.title.clone(),
            artist: track.artist_names(),
            artists: track.artists.clone(),
            album: track.album.clone(),
            popularity: track.popularity,
            duration_ms: track.duration_ms,
            duration_readable: track.duration_readable(),
            release_date: track.release_date.clone(),
            album_art: track.artwork_url.clone(),
            preview_url: track.preview_url.clone(),
            external_url: track.external_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseMetadata {
    pub subreddit: String,
    pub total_tracks_analyzed: usize,
    pub reddit_posts_found: usize,
    pub reddit_comments_found: usize,
    pub recommendations_requested: usize,
    pub recommendations_found: usize,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub playlist_name: String,
    pub recommendations: Vec<TrackResponse>,
    /// Suggestions the catalog could not match
    pub not_found: Vec<Suggestion>,
    pub metadata: ResponseMetadata,
}

impl From<&RecommendationReport> for RecommendationResponse {
    fn from(report: &RecommendationReport) -> Self {
        Self {
            success: true,
            playlist_name: report.playlist.name.clone(),
            recommendations: matched_tracks(&report.recommendations)
                .iter()
                .map(TrackResponse::from)
                .collect(),
            not_found: unresolved_suggestions(&report.recommendations),
            metadata: ResponseMetadata {
                subreddit: report.metadata.subreddit.clone(),
                total_tracks_analyzed: report.metadata.total_tracks_analyzed,
                reddit_posts_found: report.metadata.reddit_posts_found,
                reddit_comments_found: report.metadata.reddit_comments_found,
                recommendations_requested: report.metadata.num_requested,
                recommendations_found: report.metadata.num_found,
            },
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "service": SERVICE_NAME })),
    )
}

/// Service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "RedditJams - Song Recommendation API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/recommendations": {
                "method": "POST",
                "description": "Get song recommendations based on a Spotify playlist",
                "required_params": ["playlist_url"],
                "optional_params": [
                    "subreddit_name", "max_reddit_posts_per_query",
                    "max_comments_per_post", "num_top_tracks",
                    "num_top_artists", "gpt_model", "gpt_temperature",
                    "gpt_max_tokens", "num_recommendations"
                ]
            },
            "/api/health": {
                "method": "GET",
                "description": "Health check endpoint"
            }
        }
    }))
}

/// Runs the recommendation pipeline for one playlist
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppJson(request): AppJson<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if request.playlist_url.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "playlist_url is required".to_string(),
        ));
    }

    let settings = request.settings(&state.defaults);

    tracing::info!(
        request_id = %request_id,
        playlist_url = %request.playlist_url,
        subreddit = %settings.subreddit_name,
        num_recommendations = settings.num_recommendations,
        "Processing recommendation request"
    );

    let report = state
        .pipeline
        .run(&request.playlist_url, &settings)
        .await?;

    tracing::info!(
        request_id = %request_id,
        found = report.metadata.num_found,
        "Recommendation request completed"
    );

    Ok(Json(RecommendationResponse::from(&report)))
}
