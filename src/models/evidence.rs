use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Which ranking a seed came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeedCategory {
    Track,
    Artist,
}

/// What a seed searches for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SeedKind {
    /// A top track; `artist` is the track's full artist credit
    Track { title: String, artist: String },
    /// A top artist
    Artist { name: String },
}

/// A track or artist chosen to drive a community search, ranked within its category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seed {
    /// 1-based rank within the seed's category
    pub rank: usize,
    #[serde(flatten)]
    pub kind: SeedKind,
}

impl Seed {
    pub fn track(rank: usize, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            rank,
            kind: SeedKind::Track {
                title: title.into(),
                artist: artist.into(),
            },
        }
    }

    pub fn artist(rank: usize, name: impl Into<String>) -> Self {
        Self {
            rank,
            kind: SeedKind::Artist { name: name.into() },
        }
    }

    pub fn category(&self) -> SeedCategory {
        match self.kind {
            SeedKind::Track { .. } => SeedCategory::Track,
            SeedKind::Artist { .. } => SeedCategory::Artist,
        }
    }

    /// Lookup key for this seed; evidence holds this instead of the seed itself
    pub fn reference(&self) -> SeedRef {
        SeedRef {
            category: self.category(),
            rank: self.rank,
        }
    }
}

impl Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            SeedKind::Track { title, artist } => write!(f, "'{}' by {}", title, artist),
            SeedKind::Artist { name } => write!(f, "{}", name),
        }
    }
}

/// Weak reference to the seed that produced a piece of evidence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SeedRef {
    pub category: SeedCategory,
    pub rank: usize,
}

impl SeedRef {
    /// Finds the referenced seed in a seed list
    pub fn resolve<'a>(&self, seeds: &'a [Seed]) -> Option<&'a Seed> {
        seeds
            .iter()
            .find(|s| s.category() == self.category && s.rank == self.rank)
    }
}

// ============================================================================
// Community text (as handed over by the community provider)
// ============================================================================

/// A comment under a community post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawComment {
    pub body: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
}

/// A community post with its comments, in provider order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawPost {
    pub title: String,
    pub body: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub permalink: Option<String>,
    pub comments: Vec<RawComment>,
}

impl RawPost {
    /// Title and body as a single unit of text
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// Search results for the query built from one seed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub seed: Seed,
    pub query: String,
    pub posts: Vec<RawPost>,
}

// ============================================================================
// Evidence
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Post,
    Comment,
}

/// A post or comment retained by the keyword filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceUnit {
    pub source: SourceType,
    pub text: String,
    pub seed: SeedRef,
    pub created_at: DateTime<Utc>,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl EvidenceUnit {
    pub fn from_post(post: &RawPost, seed: SeedRef) -> Self {
        Self {
            source: SourceType::Post,
            text: post.combined_text(),
            seed,
            created_at: post.created_at,
            score: post.score,
            permalink: post.permalink.clone(),
            author: None,
        }
    }

    pub fn from_comment(comment: &RawComment, seed: SeedRef) -> Self {
        Self {
            source: SourceType::Comment,
            text: comment.body.clone(),
            seed,
            created_at: comment.created_at,
            score: comment.score,
            permalink: None,
            author: comment.author.clone(),
        }
    }
}

/// Evidence in discovery order. Identical units found by different
/// queries are all kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct EvidenceSet {
    units: Vec<EvidenceUnit>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unit: EvidenceUnit) {
        self.units.push(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvidenceUnit> {
        self.units.iter()
    }

    pub fn units(&self) -> &[EvidenceUnit] {
        &self.units
    }

    pub fn post_count(&self) -> usize {
        self.count(SourceType::Post)
    }

    pub fn comment_count(&self) -> usize {
        self.count(SourceType::Comment)
    }

    fn count(&self, source: SourceType) -> usize {
        self.units.iter().filter(|u| u.source == source).count()
    }
}

impl<'a> IntoIterator for &'a EvidenceSet {
    type Item = &'a EvidenceUnit;
    type IntoIter = std::slice::Iter<'a, EvidenceUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

// ============================================================================
// Reddit API Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiListing<T> {
    pub data: ApiListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<ApiThing<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiThing<T> {
    pub kind: String,
    pub data: T,
}

/// A link (t3) as returned by /r/{subreddit}/search
#[derive(Debug, Clone, Deserialize)]
pub struct ApiLink {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: Option<String>,
}

/// Converts Reddit's float epoch seconds
pub fn timestamp_from_epoch(seconds: f64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds as i64, 0)
        .single()
        .unwrap_or_default()
}
