use crate::{
    models::{ResolvedRecommendation, Suggestion},
    services::providers::CatalogProvider,
};

/// Matches each suggestion to a catalog track, one search per suggestion
///
/// Output order and length follow `suggestions`. A suggestion the catalog
/// cannot match is recorded as not found and the run continues; a failed
/// search counts as not found too. Matching quality is entirely the
/// catalog's concern.
pub async fn resolve(
    suggestions: &[Suggestion],
    catalog: &dyn CatalogProvider,
) -> Vec<ResolvedRecommendation> {
    let mut resolved = Vec::with_capacity(suggestions.len());

    for suggestion in suggestions {
        let outcome = catalog
            .search_track(&suggestion.title, &suggestion.artist)
            .await;

        let recommendation = match outcome {
            Ok(Some(track)) => {
                tracing::info!(
                    suggestion = %suggestion,
                    track_id = %track.id,
                    "Suggestion resolved"
                );
                ResolvedRecommendation::matched(suggestion.clone(), track)
            }
            Ok(None) => {
                tracing::warn!(suggestion = %suggestion, "Suggestion not found in catalog");
                ResolvedRecommendation::not_found(suggestion.clone())
            }
            Err(e) => {
                tracing::warn!(
                    suggestion = %suggestion,
                    error = %e,
                    provider = catalog.name(),
                    "Catalog search failed, treating suggestion as not found"
                );
                ResolvedRecommendation::not_found(suggestion.clone())
            }
        };

        resolved.push(recommendation);
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{matched_tracks, Track},
        services::providers::MockCatalogProvider,
    };
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn catalog_track(title: &str, artist: &str) -> Track {
        Track::new(
            format!("spotify:track:{}", title.to_lowercase()),
            title,
            vec![artist.to_string()],
            60,
        )
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_all_entries() {
        let suggestions = vec![
            Suggestion::new("One", "A"),
            Suggestion::new("Two", "B"),
            Suggestion::new("Three", "C"),
            Suggestion::new("Four", "D"),
            Suggestion::new("Five", "E"),
        ];

        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_search_track()
            .times(5)
            .returning(|title, artist| match title {
                "Two" | "Four" => Ok(None),
                _ => Ok(Some(catalog_track(title, artist))),
            });
        catalog.expect_name().return_const("mock");

        let resolved = resolve(&suggestions, &catalog).await;

        assert_eq!(resolved.len(), 5);
        let found: Vec<bool> = resolved.iter().map(|r| r.is_found()).collect();
        assert_eq!(found, vec![true, false, true, false, true]);
        assert_eq!(matched_tracks(&resolved).len(), 3);
    }

    #[tokio::test]
    async fn test_preserves_suggestion_order() {
        let suggestions = vec![
            Suggestion::new("Zebra", "Beach House"),
            Suggestion::new("Alpha", "Arca"),
            Suggestion::new("Myth", "Beach House"),
        ];

        let mut seq = Sequence::new();
        let mut catalog = MockCatalogProvider::new();
        for suggestion in &suggestions {
            let title = suggestion.title.clone();
            let artist = suggestion.artist.clone();
            catalog
                .expect_search_track()
                .with(eq(title.clone()), eq(artist.clone()))
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(Some(catalog_track(&title, &artist))));
        }

        let resolved = resolve(&suggestions, &catalog).await;

        let titles: Vec<&str> = resolved
            .iter()
            .map(|r| r.suggestion.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Zebra", "Alpha", "Myth"]);
        let track_titles: Vec<String> = matched_tracks(&resolved)
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(track_titles, vec!["Zebra", "Alpha", "Myth"]);
    }

    #[tokio::test]
    async fn test_search_error_degrades_to_not_found() {
        let suggestions = vec![Suggestion::new("Broken", "X"), Suggestion::new("Fine", "Y")];

        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_search_track()
            .returning(|title, artist| {
                if title == "Broken" {
                    Err(AppError::ExternalApi("Spotify returned 500".to_string()))
                } else {
                    Ok(Some(catalog_track(title, artist)))
                }
            });
        catalog.expect_name().return_const("mock");

        let resolved = resolve(&suggestions, &catalog).await;

        assert_eq!(resolved.len(), 2);
        assert!(!resolved[0].is_found());
        assert!(resolved[1].is_found());
    }

    #[tokio::test]
    async fn test_no_suggestions_no_searches() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_search_track().never();

        let resolved = resolve(&[], &catalog).await;
        assert!(resolved.is_empty());
    }
}
