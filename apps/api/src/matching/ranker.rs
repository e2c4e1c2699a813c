//! Similarity ranker.
//!
//! Algorithm:
//! 1. Describe the project as one labelled sentence string.
//! 2. Embed it (one collaborator call, not retried).
//! 3. Cosine-score every catalog fund against the query vector.
//! 4. Full sort, descending; equal scores keep catalog order.
//! 5. Keep the first `top_k` funds.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::Embedder;
use crate::matching::similarity::cosine_similarity;
use crate::models::{Fund, ProjectRecord};

/// A catalog position and its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredFund {
    pub index: usize,
    pub score: f32,
}

/// The text sent to the embedding service for a project.
pub fn query_text(project: &ProjectRecord) -> String {
    format!(
        "Title: {}. Location: {}. Type: {}. Description: {}. Stage: {}. Amount: {}. Needs: {}.",
        project.title,
        project.location,
        project.category,
        project.description,
        project.stage,
        project.amount,
        project.needs(),
    )
}

/// Scores every fund and returns them best-first. Ties are broken by catalog index.
///
/// Funds whose embedding length differs from the query score zero; one warning
/// per call reports how many.
pub fn score_catalog(query: &[f32], catalog: &[Fund]) -> Vec<ScoredFund> {
    let mismatched = catalog
        .iter()
        .filter(|fund| fund.embedding.len() != query.len())
        .count();
    if mismatched > 0 {
        warn!(
            mismatched,
            catalog_size = catalog.len(),
            query_dims = query.len(),
            "embedding dimension mismatch; affected funds score zero"
        );
    }

    let mut scored: Vec<ScoredFund> = catalog
        .iter()
        .enumerate()
        .map(|(index, fund)| ScoredFund {
            index,
            score: cosine_similarity(query, &fund.embedding),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });
    scored
}

/// Returns the `top_k` funds most similar to the project, best first.
///
/// An empty catalog (or `top_k == 0`) short-circuits without calling the embedder.
pub async fn rank(
    project: &ProjectRecord,
    catalog: &[Fund],
    top_k: usize,
    embedder: &dyn Embedder,
) -> Result<Vec<Fund>, AppError> {
    if catalog.is_empty() || top_k == 0 {
        return Ok(Vec::new());
    }

    let query = embedder
        .embed(&query_text(project))
        .await
        .map_err(|e| AppError::EmbeddingUnavailable(e.to_string()))?;

    let scored = score_catalog(&query, catalog);
    debug!(
        catalog_size = catalog.len(),
        top_score = scored.first().map(|s| s.score),
        "Ranked catalog"
    );

    Ok(scored
        .into_iter()
        .take(top_k)
        .map(|s| catalog[s.index].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::models::project::sample_project;
    use crate::testing::{fund_with_embedding, FakeEmbedder};

    fn catalog() -> Vec<Fund> {
        vec![
            fund_with_embedding("Far", vec![0.0, 1.0]),
            fund_with_embedding("Exact", vec![1.0, 0.0]),
            fund_with_embedding("Close", vec![0.9, 0.1]),
            fund_with_embedding("Opposite", vec![-1.0, 0.0]),
        ]
    }

    fn names(funds: &[Fund]) -> Vec<&str> {
        funds.iter().map(|f| f.fund_name.as_str()).collect()
    }

    #[test]
    fn test_query_text_uses_fixed_labels() {
        let text = query_text(&sample_project());
        assert_eq!(
            text,
            "Title: Salt Roads. Location: Portugal. Type: Documentary. \
             Description: A feature documentary following salt harvesters on the Algarve coast.. \
             Stage: Development. Amount: 50000. Needs: Development grant, Co-production."
        );
    }

    #[tokio::test]
    async fn test_rank_orders_by_similarity() {
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let ranked = rank(&sample_project(), &catalog(), 10, &embedder).await.unwrap();
        assert_eq!(names(&ranked), vec!["Exact", "Close", "Far", "Opposite"]);
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_rank_truncates_to_top_k() {
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let ranked = rank(&sample_project(), &catalog(), 2, &embedder).await.unwrap();
        assert_eq!(names(&ranked), vec!["Exact", "Close"]);
    }

    #[tokio::test]
    async fn test_empty_catalog_skips_embedding_call() {
        let embedder = FakeEmbedder::returning(vec![1.0, 0.0]);
        let ranked = rank(&sample_project(), &[], 25, &embedder).await.unwrap();
        assert!(ranked.is_empty());
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_embedding_unavailable() {
        let embedder = FakeEmbedder::failing();
        let err = rank(&sample_project(), &catalog(), 25, &embedder)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmbeddingUnavailable(_)));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let funds = vec![
            fund_with_embedding("First", vec![1.0, 1.0]),
            fund_with_embedding("Zero", vec![0.0, 0.0]),
            fund_with_embedding("Second", vec![1.0, 1.0]),
            fund_with_embedding("Third", vec![1.0, 0.0]),
        ];
        let scored = score_catalog(&[1.0, 1.0], &funds);
        let order: Vec<usize> = scored.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_scores_are_non_increasing_and_indices_valid() {
        let funds = catalog();
        let scored = score_catalog(&[0.3, 0.7], &funds);
        assert_eq!(scored.len(), funds.len());
        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(scored.iter().all(|s| s.index < funds.len()));
    }

    #[test]
    fn test_degenerate_embeddings_score_zero() {
        let funds = vec![
            fund_with_embedding("Missing", vec![]),
            fund_with_embedding("Good", vec![1.0, 0.0]),
        ];
        let scored = score_catalog(&[1.0, 0.0], &funds);
        assert_eq!(scored[0].index, 1);
        assert_eq!(scored[1].score, 0.0);
    }

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, AtomicOrdering::SeqCst);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch_warns_once_per_pass() {
        let funds: Vec<Fund> = (0..6)
            .map(|i| fund_with_embedding(&format!("Fund {i}"), vec![1.0, 0.0, 0.0]))
            .chain(std::iter::once(fund_with_embedding("Matching", vec![1.0, 0.0])))
            .collect();
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));

        let scored = tracing::subscriber::with_default(subscriber, || {
            score_catalog(&[1.0, 0.0], &funds)
        });

        assert_eq!(warnings.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(scored[0].index, 6);
        assert!(scored[1..].iter().all(|s| s.score == 0.0));
    }
}
