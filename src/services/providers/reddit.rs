/// Reddit API provider
///
/// Searches one subreddit for posts and pulls each post's comment tree.
/// Authenticates as a script app: with the password grant when account
/// credentials are configured, otherwise with the application-only grant
/// (read-only, which is all the search needs).
///
/// API Flow:
/// 1. Token: POST {auth}/api/v1/access_token
/// 2. Search: GET /r/{subreddit}/search?restrict_sr=1 → t3 listing
/// 3. Comments: GET /r/{subreddit}/comments/{id} → [post listing, comment listing]
use crate::{
    error::{AppError, AppResult},
    models::{
        evidence::{timestamp_from_epoch, ApiLink, ApiListing},
        RawComment, RawPost,
    },
    services::providers::{
        ensure_success, validate_subreddit_name, CommunityProvider, CommunityQuery, TokenCache,
        TokenResponse,
    },
};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::collections::VecDeque;

const PROVIDER: &str = "reddit";

/// Reddit account used for the password grant
#[derive(Debug, Clone)]
pub struct RedditAccount {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct RedditProvider {
    http_client: HttpClient,
    client_id: String,
    client_secret: String,
    account: Option<RedditAccount>,
    user_agent: String,
    api_url: String,
    auth_url: String,
    token: TokenCache,
}

impl RedditProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        account: Option<RedditAccount>,
        user_agent: String,
        api_url: String,
        auth_url: String,
    ) -> Self {
        tracing::info!(
            read_only = account.is_none(),
            provider = PROVIDER,
            "Reddit provider configured"
        );

        Self {
            http_client: HttpClient::new(),
            client_id,
            client_secret,
            account,
            user_agent,
            api_url,
            auth_url,
            token: TokenCache::default(),
        }
    }

    async fn access_token(&self) -> AppResult<String> {
        self.token
            .get_or_refresh(|| async move {
                let form: Vec<(&str, &str)> = match &self.account {
                    Some(account) => vec![
                        ("grant_type", "password"),
                        ("username", account.username.as_str()),
                        ("password", account.password.as_str()),
                    ],
                    None => vec![("grant_type", "client_credentials")],
                };

                let url = format!("{}/api/v1/access_token", self.auth_url);
                let response = self
                    .http_client
                    .post(&url)
                    .header(reqwest::header::USER_AGENT, &self.user_agent)
                    .basic_auth(&self.client_id, Some(&self.client_secret))
                    .form(&form)
                    .send()
                    .await?;
                let response = ensure_success(response, "Reddit auth").await?;
                Ok(response.json::<TokenResponse>().await?)
            })
            .await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> AppResult<reqwest::Response> {
        let token = self.access_token().await?;
        let response = self
            .http_client
            .get(format!("{}{}", self.api_url, path))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        ensure_success(response, "Reddit").await
    }

    async fn fetch_comments(
        &self,
        subreddit: &str,
        post_id: &str,
        max_comments: usize,
    ) -> AppResult<Vec<RawComment>> {
        let limit = max_comments.to_string();
        let path = format!("/r/{}/comments/{}", subreddit, post_id);
        let response = self
            .get(&path, &[("limit", limit.as_str()), ("raw_json", "1")])
            .await?;

        let thread: Value = response.json().await?;
        let comment_listing = thread.get(1).ok_or_else(|| {
            AppError::ExternalApi(format!("Reddit thread {} has no comment listing", post_id))
        })?;

        Ok(flatten_comments(comment_listing, max_comments))
    }
}

/// Flattens a comment listing breadth-first (top-level comments, then their
/// replies) and stops after `limit` comments. "more" stubs are skipped.
pub fn flatten_comments(listing: &Value, limit: usize) -> Vec<RawComment> {
    let mut comments = Vec::new();
    let mut queue: VecDeque<&Value> = VecDeque::new();
    queue.push_back(listing);

    while let Some(listing) = queue.pop_front() {
        let Some(children) = listing["data"]["children"].as_array() else {
            continue;
        };

        for child in children {
            if child["kind"] != "t1" {
                continue;
            }
            if comments.len() == limit {
                return comments;
            }

            let data = &child["data"];
            comments.push(RawComment {
                body: data["body"].as_str().unwrap_or_default().to_string(),
                score: data["score"].as_i64().unwrap_or_default(),
                created_at: timestamp_from_epoch(data["created_utc"].as_f64().unwrap_or_default()),
                author: data["author"]
                    .as_str()
                    .filter(|a| *a != "[deleted]")
                    .map(str::to_string),
            });

            // "replies" is an empty string when there are none
            if data["replies"].is_object() {
                queue.push_back(&data["replies"]);
            }
        }
    }

    comments
}

fn permalink_url(permalink: Option<&str>) -> Option<String> {
    permalink.map(|p| format!("https://reddit.com{}", p))
}

#[async_trait::async_trait]
impl CommunityProvider for RedditProvider {
    async fn search_posts(&self, query: &CommunityQuery) -> AppResult<Vec<RawPost>> {
        validate_subreddit_name(&query.subreddit)?;
        if query.query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let limit = query.max_posts.to_string();
        let path = format!("/r/{}/search", query.subreddit);
        let response = self
            .get(
                &path,
                &[
                    ("q", query.query.as_str()),
                    ("restrict_sr", "1"),
                    ("sort", "relevance"),
                    ("limit", limit.as_str()),
                    ("raw_json", "1"),
                ],
            )
            .await?;

        let listing: ApiListing<ApiLink> = response.json().await?;
        let links: Vec<ApiLink> = listing
            .data
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t3")
            .map(|thing| thing.data)
            .take(query.max_posts)
            .collect();

        let mut posts = Vec::with_capacity(links.len());
        for link in links {
            let comments = match self
                .fetch_comments(&query.subreddit, &link.id, query.max_comments)
                .await
            {
                Ok(comments) => comments,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        post_id = %link.id,
                        "Failed to fetch comments, keeping post without them"
                    );
                    Vec::new()
                }
            };

            posts.push(RawPost {
                permalink: permalink_url(link.permalink.as_deref()),
                title: link.title,
                body: link.selftext,
                score: link.score,
                created_at: timestamp_from_epoch(link.created_utc),
                comments,
            });
        }

        tracing::info!(
            query = %query.query,
            subreddit = %query.subreddit,
            results = posts.len(),
            provider = PROVIDER,
            "Post search completed"
        );

        Ok(posts)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
