//! Song recommendations from a Spotify playlist, Reddit listener advice and
//! a language model.
//!
//! The pipeline lives in [`services`]; [`api`] exposes it over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use config::Config;
use services::{
    providers::{
        openai::OpenAiGenerator,
        reddit::{RedditAccount, RedditProvider},
        spotify::SpotifyProvider,
    },
    KeywordFilter, RecommendationPipeline,
};

/// Wires the real Spotify, Reddit and OpenAI clients into a pipeline
pub fn build_pipeline(config: &Config) -> RecommendationPipeline {
    let catalog = SpotifyProvider::new(
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
        config.spotify_api_url.clone(),
        config.spotify_accounts_url.clone(),
    );

    let account = match (&config.reddit_username, &config.reddit_password) {
        (Some(username), Some(password)) => Some(RedditAccount {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };
    let community = RedditProvider::new(
        config.reddit_client_id.clone(),
        config.reddit_client_secret.clone(),
        account,
        config.reddit_user_agent.clone(),
        config.reddit_api_url.clone(),
        config.reddit_auth_url.clone(),
    );

    let generator =
        OpenAiGenerator::new(config.openai_api_key.clone(), config.openai_api_url.clone());

    RecommendationPipeline::new(
        Arc::new(catalog),
        Arc::new(community),
        Arc::new(generator),
        KeywordFilter::new(&config.recommendation_keywords),
    )
}

/// Installs the global tracing subscriber, honoring `RUST_LOG`
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redditjams_api=debug,recommend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
