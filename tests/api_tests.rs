use std::sync::Arc;

use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;

use redditjams_api::{
    api::{create_router, AppState},
    error::{AppError, AppResult},
    models::{Playlist, PlaylistInfo, RawComment, RawPost, Suggestion, Track},
    services::{
        providers::{
            CatalogProvider, CommunityProvider, CommunityQuery, GenerationContext,
            SuggestionGenerator,
        },
        KeywordFilter, PipelineSettings, RecommendationPipeline,
    },
};

struct StaticCatalog {
    tracks: Vec<Track>,
}

#[async_trait::async_trait]
impl CatalogProvider for StaticCatalog {
    async fn fetch_playlist(&self, playlist_ref: &str) -> AppResult<Playlist> {
        if playlist_ref.contains("missing") {
            return Err(AppError::ExternalApi(
                "Spotify API returned status 404 Not Found".to_string(),
            ));
        }

        Ok(Playlist {
            info: PlaylistInfo {
                id: "3XyDvjoxiae0oWpfJ4kga9".to_string(),
                name: "Dream Pop Essentials".to_string(),
                description: None,
                owner: Some("tester".to_string()),
                total_tracks: self.tracks.len(),
                external_url: None,
            },
            tracks: self.tracks.clone(),
        })
    }

    async fn search_track(&self, title: &str, artist: &str) -> AppResult<Option<Track>> {
        if title == "Imaginary Song" {
            return Ok(None);
        }
        let mut track = Track::new(
            format!("spotify:track:{}", title.replace(' ', "")),
            title,
            vec![artist.to_string()],
            65,
        );
        track.duration_ms = 241_000;
        Ok(Some(track))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

struct StaticCommunity;

#[async_trait::async_trait]
impl CommunityProvider for StaticCommunity {
    async fn search_posts(&self, query: &CommunityQuery) -> AppResult<Vec<RawPost>> {
        Ok(vec![RawPost {
            title: format!("Looking for something like {}", query.query),
            body: String::new(),
            score: 12,
            created_at: Utc::now(),
            permalink: None,
            comments: vec![RawComment {
                body: "check out Beach House".to_string(),
                score: 4,
                created_at: Utc::now(),
                author: Some("listener".to_string()),
            }],
        }])
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

struct StaticGenerator;

#[async_trait::async_trait]
impl SuggestionGenerator for StaticGenerator {
    async fn generate(&self, context: &GenerationContext) -> AppResult<Vec<Suggestion>> {
        let pool = vec![
            Suggestion::new("Myth", "Beach House"),
            Suggestion::new("Imaginary Song", "Nobody"),
            Suggestion::new("Sometimes", "My Bloody Valentine"),
        ];
        Ok(pool.into_iter().take(context.num_recommendations).collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn create_test_server(tracks: Vec<Track>) -> TestServer {
    let pipeline = RecommendationPipeline::new(
        Arc::new(StaticCatalog { tracks }),
        Arc::new(StaticCommunity),
        Arc::new(StaticGenerator),
        KeywordFilter::default(),
    );
    let state = AppState::new(pipeline, PipelineSettings::default());
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn playlist_tracks() -> Vec<Track> {
    vec![
        Track::new("spotify:track:a", "Alison", vec!["Slowdive".to_string()], 62),
        Track::new("spotify:track:b", "Space Song", vec!["Beach House".to_string()], 88),
        Track::new("spotify:track:c", "Cherry-coloured Funk", vec!["Cocteau Twins".to_string()], 55),
    ]
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(playlist_tracks());
    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "RedditJams API");
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let server = create_test_server(playlist_tracks());
    let response = server.get("/").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["endpoints"]["/api/recommendations"]["method"], "POST");
}

#[tokio::test]
async fn test_recommendations_flow() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "playlist_url": "https://open.spotify.com/playlist/3XyDvjoxiae0oWpfJ4kga9"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["success"], true);
    assert_eq!(body["playlist_name"], "Dream Pop Essentials");

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0]["name"], "Myth");
    assert_eq!(recommendations[0]["duration_readable"], "4:01");
    assert_eq!(recommendations[1]["name"], "Sometimes");

    assert_eq!(body["not_found"][0]["title"], "Imaginary Song");
    assert_eq!(body["metadata"]["total_tracks_analyzed"], 3);
    // 3 track seeds + 3 artist seeds, one matching post and comment each
    assert_eq!(body["metadata"]["reddit_posts_found"], 6);
    assert_eq!(body["metadata"]["reddit_comments_found"], 6);
    assert_eq!(body["metadata"]["recommendations_requested"], 5);
    assert_eq!(body["metadata"]["recommendations_found"], 2);
}

#[tokio::test]
async fn test_recommendation_count_override() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "playlist_url": "3XyDvjoxiae0oWpfJ4kga9",
            "num_recommendations": 1
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);
    assert_eq!(body["metadata"]["recommendations_requested"], 1);
}

#[tokio::test]
async fn test_missing_playlist_url_is_bad_request() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "subreddit_name": "music" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "playlist_url is required");
}

#[tokio::test]
async fn test_empty_playlist_is_bad_request() {
    let server = create_test_server(vec![]);

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "playlist_url": "3XyDvjoxiae0oWpfJ4kga9" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_failure_is_bad_gateway() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "playlist_url": "missing" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .get("/api/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static("trace-me-123"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "trace-me-123");

    let response = server.get("/api/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .post("/api/recommendations")
        .text("not json")
        .content_type("application/json")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("JSON"));
}

#[tokio::test]
async fn test_wrong_field_type_uses_error_envelope() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "playlist_url": "3XyDvjoxiae0oWpfJ4kga9",
            "num_recommendations": "five"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_path_like_subreddit_is_bad_request() {
    let server = create_test_server(playlist_tracks());

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "playlist_url": "3XyDvjoxiae0oWpfJ4kga9",
            "subreddit_name": "../../api/v1/me"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}
