//! Domain types flowing through the recommendation pipeline, plus the wire
//! types of the collaborator APIs they are converted from.

pub mod evidence;
pub mod suggestion;
pub mod track;

pub use evidence::{
    EvidenceSet, EvidenceUnit, QueryResult, RawComment, RawPost, Seed, SeedCategory, SeedKind,
    SeedRef, SourceType,
};
pub use suggestion::{
    matched_tracks, unresolved_suggestions, Resolution, ResolvedRecommendation, Suggestion,
};
pub use track::{Playlist, PlaylistInfo, Track};
