use crate::{
    models::{EvidenceSet, EvidenceUnit, QueryResult},
    services::keyword_filter::KeywordFilter,
};

/// Merges per-query community results into one evidence set
///
/// Each query contributes at most `max_posts_per_query` posts, each post at
/// most `max_comments_per_post` comments, both taken in provider order. A post's
/// text and each of its comments pass the filter independently. Units are
/// appended in query order, then post order, with a post's own unit ahead of
/// its comments. Identical text surfacing under several queries is kept.
pub fn aggregate(
    results: &[QueryResult],
    filter: &KeywordFilter,
    max_posts_per_query: usize,
    max_comments_per_post: usize,
) -> EvidenceSet {
    let mut evidence = EvidenceSet::new();

    for result in results {
        let seed = result.seed.reference();
        let before = evidence.len();

        for post in result.posts.iter().take(max_posts_per_query) {
            let text = post.combined_text();
            if filter.accepts(&text) {
                evidence.push(EvidenceUnit::from_post(post, seed));
            }

            for comment in post.comments.iter().take(max_comments_per_post) {
                if filter.accepts(&comment.body) {
                    evidence.push(EvidenceUnit::from_comment(comment, seed));
                }
            }
        }

        tracing::debug!(
            query = %result.query,
            posts = result.posts.len(),
            retained = evidence.len() - before,
            "Filtered query results"
        );
    }

    evidence
}
