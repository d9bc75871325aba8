use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::Track;

/// A free-text song suggestion from the language model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Suggestion {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            reason: None,
        }
    }
}

impl Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' by {}", self.title, self.artist)
    }
}

/// Outcome of looking a suggestion up in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "track", rename_all = "snake_case")]
pub enum Resolution {
    Matched(Track),
    NotFound,
}

/// A suggestion paired with its catalog match, if any
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedRecommendation {
    pub suggestion: Suggestion,
    pub resolution: Resolution,
}

impl ResolvedRecommendation {
    pub fn matched(suggestion: Suggestion, track: Track) -> Self {
        Self {
            suggestion,
            resolution: Resolution::Matched(track),
        }
    }

    pub fn not_found(suggestion: Suggestion) -> Self {
        Self {
            suggestion,
            resolution: Resolution::NotFound,
        }
    }

    pub fn track(&self) -> Option<&Track> {
        match &self.resolution {
            Resolution::Matched(track) => Some(track),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.track().is_some()
    }
}

/// Matched tracks only, in suggestion order
pub fn matched_tracks(resolved: &[ResolvedRecommendation]) -> Vec<Track> {
    resolved.iter().filter_map(|r| r.track().cloned()).collect()
}

/// Suggestions the catalog could not resolve, in suggestion order
pub fn unresolved_suggestions(resolved: &[ResolvedRecommendation]) -> Vec<Suggestion> {
    resolved
        .iter()
        .filter(|r| !r.is_found())
        .map(|r| r.suggestion.clone())
        .collect()
}
