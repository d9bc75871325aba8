use anyhow::Context;
use redditjams_api::{
    api::{create_router, AppState},
    build_pipeline,
    config::Config,
    init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    // Initialize application state
    let state = AppState::new(build_pipeline(&config), config.pipeline_settings());

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, subreddit = %config.subreddit_name, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
