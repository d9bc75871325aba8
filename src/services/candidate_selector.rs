use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{Seed, Track},
};

/// Derives the ranked search seeds for a playlist
///
/// Track seeds are the `top_track_count` most popular tracks (ties keep
/// playlist order). Artist seeds are the first `top_artist_count` distinct
/// artists in playlist order, not ranked by popularity. Output is all track
/// seeds followed by all artist seeds, ranks restarting at 1 per category.
pub fn select(
    tracks: &[Track],
    top_track_count: usize,
    top_artist_count: usize,
) -> AppResult<Vec<Seed>> {
    if tracks.is_empty() {
        return Err(AppError::InvalidInput(
            "Playlist has no tracks to seed a search from".to_string(),
        ));
    }

    let mut by_popularity: Vec<&Track> = tracks.iter().collect();
    // sort_by is stable
    by_popularity.sort_by(|a, b| b.popularity.cmp(&a.popularity));

    let track_seeds = by_popularity
        .into_iter()
        .take(top_track_count)
        .enumerate()
        .map(|(idx, track)| Seed::track(idx + 1, track.title.clone(), track.artist_names()));

    let artist_seeds = unique_artists(tracks)
        .into_iter()
        .take(top_artist_count)
        .enumerate()
        .map(|(idx, artist)| Seed::artist(idx + 1, artist));

    let seeds: Vec<Seed> = track_seeds.chain(artist_seeds).collect();

    tracing::debug!(
        tracks = tracks.len(),
        seeds = seeds.len(),
        "Selected search seeds"
    );

    Ok(seeds)
}

/// Artist names in playlist (then credit) order, first occurrence wins
fn unique_artists(tracks: &[Track]) -> Vec<&str> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .flat_map(|t| t.artists.iter())
        .map(String::as_str)
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeedCategory, SeedKind};

    fn track(idx: usize, artist: &str, popularity: u8) -> Track {
        Track::new(
            format!("spotify:track:{}", idx),
            format!("Song {}", idx),
            vec![artist.to_string()],
            popularity,
        )
    }

    fn track_titles(seeds: &[Seed]) -> Vec<String> {
        seeds
            .iter()
            .filter_map(|s| match &s.kind {
                SeedKind::Track { title, .. } => Some(title.clone()),
                SeedKind::Artist { .. } => None,
            })
            .collect()
    }

    fn artist_names(seeds: &[Seed]) -> Vec<String> {
        seeds
            .iter()
            .filter_map(|s| match &s.kind {
                SeedKind::Artist { name } => Some(name.clone()),
                SeedKind::Track { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_playlist_is_input_error() {
        let result = select(&[], 5, 3);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_popularity_ranking_with_stable_ties() {
        let tracks = vec![
            track(0, "A", 40),
            track(1, "B", 90),
            track(2, "C", 60),
            track(3, "D", 90),
        ];

        let seeds = select(&tracks, 3, 0).unwrap();

        assert_eq!(track_titles(&seeds), vec!["Song 1", "Song 3", "Song 2"]);
        let ranks: Vec<usize> = seeds.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_artist_dedup_first_occurrence_wins() {
        let tracks = vec![
            track(0, "A", 10),
            track(1, "B", 20),
            track(2, "A", 30),
            track(3, "C", 40),
        ];

        let seeds = select(&tracks, 0, 2).unwrap();
        assert_eq!(artist_names(&seeds), vec!["A", "B"]);
    }

    #[test]
    fn test_featured_artists_follow_credit_order() {
        let mut collab = track(0, "A", 50);
        collab.artists.push("B".to_string());
        let tracks = vec![collab, track(1, "C", 50)];

        let seeds = select(&tracks, 1, 3).unwrap();

        assert_eq!(
            seeds[0].kind,
            SeedKind::Track {
                title: "Song 0".to_string(),
                artist: "A, B".to_string()
            }
        );
        assert_eq!(artist_names(&seeds), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_duplicate_tracks_not_deduplicated() {
        let tracks = vec![track(0, "A", 70), track(0, "A", 70)];
        let seeds = select(&tracks, 5, 0).unwrap();
        assert_eq!(track_titles(&seeds), vec!["Song 0", "Song 0"]);
    }

    #[test]
    fn test_track_seeds_precede_artist_seeds_with_reset_ranks() {
        let tracks = vec![track(0, "A", 10), track(1, "B", 20), track(2, "C", 30)];
        let seeds = select(&tracks, 2, 2).unwrap();

        let layout: Vec<(SeedCategory, usize)> =
            seeds.iter().map(|s| (s.category(), s.rank)).collect();
        assert_eq!(
            layout,
            vec![
                (SeedCategory::Track, 1),
                (SeedCategory::Track, 2),
                (SeedCategory::Artist, 1),
                (SeedCategory::Artist, 2),
            ]
        );
    }

    #[test]
    fn test_counts_larger_than_playlist() {
        let tracks = vec![track(0, "A", 10)];
        let seeds = select(&tracks, 5, 3).unwrap();
        assert_eq!(seeds.len(), 2);
    }

    #[test]
    fn test_select_is_idempotent() {
        let tracks = vec![
            track(0, "A", 55),
            track(1, "B", 55),
            track(2, "A", 80),
            track(3, "C", 12),
        ];

        let first = select(&tracks, 3, 3).unwrap();
        let second = select(&tracks, 3, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_six_track_playlist_scenario() {
        let popularities = [10, 20, 30, 40, 50, 95];
        let artists = ["A", "B", "C", "D", "E", "F"];
        let tracks: Vec<Track> = popularities
            .iter()
            .zip(artists.iter())
            .enumerate()
            .map(|(idx, (pop, artist))| track(idx, artist, *pop))
            .collect();

        let seeds = select(&tracks, 3, 3).unwrap();

        assert_eq!(track_titles(&seeds), vec!["Song 5", "Song 4", "Song 3"]);
        assert_eq!(artist_names(&seeds), vec!["A", "B", "C"]);
    }
}
