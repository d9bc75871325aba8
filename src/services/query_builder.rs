use crate::models::{Seed, SeedKind};

/// Builds the community search queries for a seed
///
/// Returns logical query text only; escaping for the transport is left to
/// the community provider.
pub fn build(seed: &Seed) -> Vec<String> {
    match &seed.kind {
        SeedKind::Track { title, artist } => vec![format!("{} {} recommend", title, artist)],
        SeedKind::Artist { name } => vec![format!("{} recommend similar", name)],
    }
}
