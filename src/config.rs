use serde::Deserialize;

use crate::services::keyword_filter::DEFAULT_KEYWORDS;
use crate::services::recommendations::PipelineSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Spotify application credentials (client-credentials flow)
    pub spotify_client_id: String,
    pub spotify_client_secret: String,

    /// Spotify Web API base URL
    #[serde(default = "default_spotify_api_url")]
    pub spotify_api_url: String,

    /// Spotify accounts service base URL (token endpoint)
    #[serde(default = "default_spotify_accounts_url")]
    pub spotify_accounts_url: String,

    /// Reddit script-app credentials
    pub reddit_client_id: String,
    pub reddit_client_secret: String,

    /// Optional Reddit account; without it the app-only grant is used
    #[serde(default)]
    pub reddit_username: Option<String>,
    #[serde(default)]
    pub reddit_password: Option<String>,

    #[serde(default = "default_reddit_user_agent")]
    pub reddit_user_agent: String,

    #[serde(default = "default_reddit_api_url")]
    pub reddit_api_url: String,

    #[serde(default = "default_reddit_auth_url")]
    pub reddit_auth_url: String,

    /// OpenAI API key
    pub openai_api_key: String,

    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_subreddit_name")]
    pub subreddit_name: String,

    #[serde(default = "default_max_reddit_posts_per_query")]
    pub max_reddit_posts_per_query: usize,

    #[serde(default = "default_max_comments_per_post")]
    pub max_comments_per_post: usize,

    #[serde(default = "default_num_top_tracks")]
    pub num_top_tracks: usize,

    #[serde(default = "default_num_top_artists")]
    pub num_top_artists: usize,

    #[serde(default = "default_num_recommendations")]
    pub num_recommendations: usize,

    #[serde(default = "default_gpt_model")]
    pub gpt_model: String,

    #[serde(default = "default_gpt_temperature")]
    pub gpt_temperature: f32,

    #[serde(default = "default_gpt_max_tokens")]
    pub gpt_max_tokens: u32,

    /// Comma-separated keyword list for the recommendation filter
    #[serde(default = "default_recommendation_keywords")]
    pub recommendation_keywords: Vec<String>,
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_spotify_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_reddit_user_agent() -> String {
    "redditjams/0.1 (song recommendations)".to_string()
}

fn default_reddit_api_url() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_reddit_auth_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_subreddit_name() -> String {
    "music".to_string()
}

fn default_max_reddit_posts_per_query() -> usize {
    20
}

fn default_max_comments_per_post() -> usize {
    30
}

fn default_num_top_tracks() -> usize {
    5
}

fn default_num_top_artists() -> usize {
    3
}

fn default_num_recommendations() -> usize {
    5
}

fn default_gpt_model() -> String {
    "gpt-4".to_string()
}

fn default_gpt_temperature() -> f32 {
    0.7
}

fn default_gpt_max_tokens() -> u32 {
    500
}

fn default_recommendation_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Pipeline defaults applied when a request does not override them
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            subreddit_name: self.subreddit_name.clone(),
            max_reddit_posts_per_query: self.max_reddit_posts_per_query,
            max_comments_per_post: self.max_comments_per_post,
            num_top_tracks: self.num_top_tracks,
            num_top_artists: self.num_top_artists,
            num_recommendations: self.num_recommendations,
            gpt_model: self.gpt_model.clone(),
            gpt_temperature: self.gpt_temperature,
            gpt_max_tokens: self.gpt_max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_vars() -> Vec<(String, String)> {
        vec![
            ("SPOTIFY_CLIENT_ID".to_string(), "sp-id".to_string()),
            ("SPOTIFY_CLIENT_SECRET".to_string(), "sp-secret".to_string()),
            ("REDDIT_CLIENT_ID".to_string(), "rd-id".to_string()),
            ("REDDIT_CLIENT_SECRET".to_string(), "rd-secret".to_string()),
            ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(required_vars()).unwrap();

        assert_eq!(config.subreddit_name, "music");
        assert_eq!(config.max_reddit_posts_per_query, 20);
        assert_eq!(config.max_comments_per_post, 30);
        assert_eq!(config.num_top_tracks, 5);
        assert_eq!(config.num_top_artists, 3);
        assert_eq!(config.num_recommendations, 5);
        assert_eq!(config.gpt_model, "gpt-4");
        assert_eq!(config.reddit_username, None);
        assert_eq!(config.recommendation_keywords.len(), DEFAULT_KEYWORDS.len());
    }

    #[test]
    fn test_keywords_from_comma_separated_list() {
        let mut vars = required_vars();
        vars.push((
            "RECOMMENDATION_KEYWORDS".to_string(),
            "recommend,sounds like".to_string(),
        ));

        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(
            config.recommendation_keywords,
            vec!["recommend".to_string(), "sounds like".to_string()]
        );
    }

    #[test]
    fn test_missing_credentials_fail() {
        let result = envy::from_iter::<_, Config>(Vec::<(String, String)>::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_pipeline_settings_mirror_config() {
        let mut vars = required_vars();
        vars.push(("SUBREDDIT_NAME".to_string(), "indieheads".to_string()));
        vars.push(("NUM_RECOMMENDATIONS".to_string(), "8".to_string()));

        let config: Config = envy::from_iter(vars).unwrap();
        let settings = config.pipeline_settings();
        assert_eq!(settings.subreddit_name, "indieheads");
        assert_eq!(settings.num_recommendations, 8);
        assert_eq!(settings.num_top_tracks, 5);
    }
}
