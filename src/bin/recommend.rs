//! Runs the recommendation pipeline once for a playlist and prints the result.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use redditjams_api::{build_pipeline, config::Config, init_tracing, models::Resolution};

/// Command-line arguments for the batch runner
#[derive(Parser, Debug)]
#[command(name = "recommend")]
#[command(about = "Recommend songs for a Spotify playlist from Reddit listener advice")]
#[command(version)]
struct Args {
    /// Spotify playlist URL, URI or ID
    playlist_url: String,

    /// Write the full run report as JSON to this file
    output: Option<PathBuf>,

    /// Subreddit to search instead of the configured one
    #[arg(short, long)]
    subreddit: Option<String>,

    /// Number of songs to recommend
    #[arg(short, long)]
    num_recommendations: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    let config = Config::from_env()?;
    let mut settings = config.pipeline_settings();
    if let Some(subreddit) = args.subreddit {
        settings.subreddit_name = subreddit;
    }
    if let Some(count) = args.num_recommendations {
        settings.num_recommendations = count;
    }
    let playlist_url = args.playlist_url;

    tracing::info!(
        playlist_url = %playlist_url,
        subreddit = %settings.subreddit_name,
        max_posts_per_query = settings.max_reddit_posts_per_query,
        max_comments_per_post = settings.max_comments_per_post,
        top_tracks = settings.num_top_tracks,
        top_artists = settings.num_top_artists,
        model = %settings.gpt_model,
        recommendations = settings.num_recommendations,
        "Starting recommendation run"
    );

    let pipeline = build_pipeline(&config);
    let report = pipeline.run(&playlist_url, &settings).await?;

    if report.metadata.num_found == 0 {
        tracing::info!("No recommendations found");
    }

    let mut rank = 0;
    for recommendation in &report.recommendations {
        match &recommendation.resolution {
            Resolution::Matched(track) => {
                rank += 1;
                tracing::info!(
                    rank,
                    name = %track.title,
                    artist = %track.artist_names(),
                    album = %track.album,
                    release = track.release_date.as_deref().unwrap_or("unknown"),
                    duration = %track.duration_readable(),
                    popularity = track.popularity,
                    listen = track.external_url.as_deref().unwrap_or("-"),
                    album_art = track.artwork_url.as_deref().unwrap_or("-"),
                    preview = track.preview_url.as_deref().unwrap_or("-"),
                    uri = %track.id,
                    "Recommendation"
                );
            }
            Resolution::NotFound => {
                tracing::info!(suggestion = %recommendation.suggestion, "Not found on Spotify");
            }
        }
    }

    if let Some(path) = args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Report written");
    }

    tracing::info!(
        found = report.metadata.num_found,
        requested = report.metadata.num_requested,
        "Recommendation run completed"
    );

    Ok(())
}
