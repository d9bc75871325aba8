/// OpenAI chat-completions suggestion generator
///
/// Sends the playlist summary, the seeds and the Reddit evidence (as JSON)
/// in a single prompt and asks for a JSON array of `{title, artist, reason}`.
use crate::{
    error::{AppError, AppResult},
    models::{SeedKind, Suggestion},
    services::providers::{ensure_success, GenerationContext, SuggestionGenerator},
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

const PROVIDER: &str = "openai";
/// Evidence units beyond this are left out of the prompt
const MAX_PROMPT_EVIDENCE: usize = 150;
const MAX_EVIDENCE_CHARS: usize = 400;

const SYSTEM_PROMPT: &str = "\
You are a music recommendation expert. You read what real listeners on Reddit \
recommend to fans of certain songs and artists, and you suggest new songs for a \
playlist.\n\n\
Rules:\n\
- Only suggest songs that exist and can be found on Spotify.\n\
- Never suggest a song that is already in the playlist's top tracks.\n\
- Prefer songs and artists that Reddit users actually mention.\n\
- Answer with a JSON array only, no prose: \
[{\"title\": \"...\", \"artist\": \"...\", \"reason\": \"...\"}]";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Renders the user prompt for a generation context
pub fn build_prompt(context: &GenerationContext) -> String {
    let top_tracks: Vec<String> = context
        .top_tracks
        .iter()
        .filter_map(|seed| match &seed.kind {
            SeedKind::Track { title, artist } => Some(format!("{}. {} - {}", seed.rank, title, artist)),
            SeedKind::Artist { .. } => None,
        })
        .collect();

    let top_artists: Vec<String> = context
        .top_artists
        .iter()
        .filter_map(|seed| match &seed.kind {
            SeedKind::Artist { name } => Some(name.clone()),
            SeedKind::Track { .. } => None,
        })
        .collect();

    let evidence: Vec<serde_json::Value> = context
        .evidence
        .iter()
        .take(MAX_PROMPT_EVIDENCE)
        .map(|unit| {
            json!({
                "type": unit.source,
                "score": unit.score,
                "text": truncate_chars(&unit.text, MAX_EVIDENCE_CHARS),
            })
        })
        .collect();

    let payload = json!({
        "playlist": {
            "name": context.playlist.name,
            "description": context.playlist.description,
            "total_tracks": context.playlist.total_tracks,
        },
        "top_tracks": top_tracks,
        "top_artists": top_artists,
        "reddit_evidence": evidence,
    });

    let evidence_note = if context.evidence.is_empty() {
        format!(
            "No recommendations were found on r/{}; base your suggestions on the playlist alone.",
            context.subreddit
        )
    } else {
        format!(
            "The reddit_evidence entries are posts and comments from r/{} that recommend music.",
            context.subreddit
        )
    };

    format!(
        "{}\n\n{}\n\nSuggest exactly {} new songs for this playlist.",
        serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string()),
        evidence_note,
        context.num_recommendations
    )
}

/// Extracts the suggestion array from model output
///
/// Tolerates markdown code fences and surrounding prose. Entries with a
/// blank title or artist are dropped.
pub fn parse_suggestions(content: &str) -> AppResult<Vec<Suggestion>> {
    let start = content.find('[');
    let end = content.rfind(']');

    let array = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(AppError::ExternalApi(format!(
                "Model output contains no JSON array: {}",
                truncate_chars(content, 200)
            )))
        }
    };

    let suggestions: Vec<Suggestion> = serde_json::from_str(array).map_err(|e| {
        AppError::ExternalApi(format!("Failed to parse model suggestions: {}", e))
    })?;

    Ok(suggestions
        .into_iter()
        .filter(|s| !s.title.trim().is_empty() && !s.artist.trim().is_empty())
        .collect())
}

#[async_trait::async_trait]
impl SuggestionGenerator for OpenAiGenerator {
    async fn generate(&self, context: &GenerationContext) -> AppResult<Vec<Suggestion>> {
        let request = ChatRequest {
            model: &context.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(context),
                },
            ],
            temperature: context.temperature,
            max_tokens: context.max_tokens,
        };

        let url = format!("{}/chat/completions", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response, "OpenAI").await?;

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ExternalApi("OpenAI returned no completion".to_string()))?;

        tracing::debug!(content = %content, "Raw model output");

        let suggestions = parse_suggestions(&content)?;

        tracing::info!(
            model = %context.model,
            requested = context.num_recommendations,
            suggestions = suggestions.len(),
            provider = PROVIDER,
            "Suggestions generated"
        );

        Ok(suggestions)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
