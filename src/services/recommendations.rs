use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::AppResult,
    models::{
        EvidenceSet, PlaylistInfo, QueryResult, ResolvedRecommendation, Seed, SeedCategory,
        Suggestion, Track,
    },
    services::{
        candidate_selector, evidence,
        keyword_filter::KeywordFilter,
        providers::{
            validate_subreddit_name, CatalogProvider, CommunityProvider, CommunityQuery,
            GenerationContext, SuggestionGenerator,
        },
        query_builder, resolver,
    },
};

/// Tunables for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSettings {
    pub subreddit_name: String,
    pub max_reddit_posts_per_query: usize,
    pub max_comments_per_post: usize,
    pub num_top_tracks: usize,
    pub num_top_artists: usize,
    pub num_recommendations: usize,
    pub gpt_model: String,
    pub gpt_temperature: f32,
    pub gpt_max_tokens: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            subreddit_name: "music".to_string(),
            max_reddit_posts_per_query: 20,
            max_comments_per_post: 30,
            num_top_tracks: 5,
            num_top_artists: 3,
            num_recommendations: 5,
            gpt_model: "gpt-4".to_string(),
            gpt_temperature: 0.7,
            gpt_max_tokens: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportMetadata {
    pub subreddit: String,
    pub total_tracks_analyzed: usize,
    pub reddit_posts_found: usize,
    pub reddit_comments_found: usize,
    pub num_requested: usize,
    pub num_found: usize,
}

/// Every stage's output of one run, for the caller and for audit export
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationReport {
    pub playlist: PlaylistInfo,
    pub tracks: Vec<Track>,
    pub seeds: Vec<Seed>,
    pub queries: Vec<String>,
    pub evidence: EvidenceSet,
    pub suggestions: Vec<Suggestion>,
    pub recommendations: Vec<ResolvedRecommendation>,
    pub metadata: ReportMetadata,
}

/// Playlist → seeds → community search → evidence → suggestions → catalog tracks
///
/// Holds the collaborator handles; each run is independent and stateless.
pub struct RecommendationPipeline {
    catalog: Arc<dyn CatalogProvider>,
    community: Arc<dyn CommunityProvider>,
    generator: Arc<dyn SuggestionGenerator>,
    filter: KeywordFilter,
}

impl RecommendationPipeline {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        community: Arc<dyn CommunityProvider>,
        generator: Arc<dyn SuggestionGenerator>,
        filter: KeywordFilter,
    ) -> Self {
        Self {
            catalog,
            community,
            generator,
            filter,
        }
    }

    pub async fn run(
        &self,
        playlist_ref: &str,
        settings: &PipelineSettings,
    ) -> AppResult<RecommendationReport> {
        let start = Instant::now();

        validate_subreddit_name(&settings.subreddit_name)?;

        let playlist = self.catalog.fetch_playlist(playlist_ref).await?;
        tracing::info!(
            playlist = %playlist.info.name,
            tracks = playlist.tracks.len(),
            "Playlist loaded"
        );

        let seeds = candidate_selector::select(
            &playlist.tracks,
            settings.num_top_tracks,
            settings.num_top_artists,
        )?;

        let results = self.search_community(&seeds, settings).await;
        let queries: Vec<String> = results.iter().map(|r| r.query.clone()).collect();

        let evidence = evidence::aggregate(
            &results,
            &self.filter,
            settings.max_reddit_posts_per_query,
            settings.max_comments_per_post,
        );
        if evidence.is_empty() {
            tracing::info!(
                subreddit = %settings.subreddit_name,
                "No Reddit recommendations found, generating from playlist alone"
            );
        } else {
            tracing::info!(
                posts = evidence.post_count(),
                comments = evidence.comment_count(),
                "Reddit evidence collected"
            );
        }

        let (top_tracks, top_artists): (Vec<Seed>, Vec<Seed>) = seeds
            .iter()
            .cloned()
            .partition(|s| s.category() == SeedCategory::Track);

        let context = GenerationContext {
            playlist: playlist.info.clone(),
            top_tracks,
            top_artists,
            evidence,
            subreddit: settings.subreddit_name.clone(),
            num_recommendations: settings.num_recommendations,
            model: settings.gpt_model.clone(),
            temperature: settings.gpt_temperature,
            max_tokens: settings.gpt_max_tokens,
        };

        let mut suggestions = self.generator.generate(&context).await?;
        tracing::info!(
            suggestions = suggestions.len(),
            generator = self.generator.name(),
            "Suggestions received"
        );
        if suggestions.len() > settings.num_recommendations {
            tracing::debug!(
                returned = suggestions.len(),
                requested = settings.num_recommendations,
                "Dropping surplus suggestions"
            );
            suggestions.truncate(settings.num_recommendations);
        }

        let recommendations = resolver::resolve(&suggestions, self.catalog.as_ref()).await;
        let num_found = recommendations.iter().filter(|r| r.is_found()).count();

        let evidence = context.evidence;
        let metadata = ReportMetadata {
            subreddit: settings.subreddit_name.clone(),
            total_tracks_analyzed: playlist.tracks.len(),
            reddit_posts_found: evidence.post_count(),
            reddit_comments_found: evidence.comment_count(),
            num_requested: settings.num_recommendations,
            num_found,
        };

        tracing::info!(
            requested = metadata.num_requested,
            found = metadata.num_found,
            duration_ms = start.elapsed().as_millis() as u64,
            "Recommendation run completed"
        );

        Ok(RecommendationReport {
            playlist: playlist.info,
            tracks: playlist.tracks,
            seeds,
            queries,
            evidence,
            suggestions,
            recommendations,
            metadata,
        })
    }

    /// Runs every seed query in parallel and returns results in seed order
    ///
    /// A failed query contributes zero posts.
    async fn search_community(
        &self,
        seeds: &[Seed],
        settings: &PipelineSettings,
    ) -> Vec<QueryResult> {
        let mut tasks = Vec::new();

        for seed in seeds {
            for query in query_builder::build(seed) {
                let provider = Arc::clone(&self.community);
                let request = CommunityQuery {
                    subreddit: settings.subreddit_name.clone(),
                    query: query.clone(),
                    max_posts: settings.max_reddit_posts_per_query,
                    max_comments: settings.max_comments_per_post,
                };
                let task = tokio::spawn(async move { provider.search_posts(&request).await });
                tasks.push((seed.clone(), query, task));
            }
        }

        let mut results = Vec::with_capacity(tasks.len());

        // Awaiting in spawn order keeps canonical query order
        for (seed, query, task) in tasks {
            let posts = match task.await {
                Ok(Ok(posts)) => posts,
                Ok(Err(e)) => {
                    tracing::warn!(
                        error = %e,
                        query = %query,
                        provider = self.community.name(),
                        "Community search failed"
                    );
                    Vec::new()
                }
                Err(e) => {
                    tracing::error!(error = %e, query = %query, "Task join error");
                    Vec::new()
                }
            };

            tracing::info!(
                seed = %seed,
                posts = posts.len(),
                provider = self.community.name(),
                "Searched community"
            );
            results.push(QueryResult { seed, query, posts });
        }

        results
    }
}
