//! Reranking candidates retrieved from the vector store.

use crate::error::Result;

/// A single candidate passed to a [`Reranker`].
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Candidate text.
    pub text: String,
    /// Opaque identifier carried through unchanged.
    pub id: i64,
    /// Retrieval-stage score (not comparable across rerankers).
    pub retrieval_score: f64,
}

/// A reranked candidate, carrying the reranker's relevance score.
#[derive(Debug, Clone)]
pub struct Ranked {
    /// The original candidate.
    pub candidate: Candidate,
    /// Relevance score assigned by the reranker; higher is more relevant.
    pub relevance_score: f64,
}

/// Reorders retrieval candidates by relevance to a query.
pub trait Reranker: Send + Sync {
    /// Reranks `candidates` against `query`, returning the top `k` sorted
    /// descending by `relevance_score`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reranking model is unavailable.
    fn rerank(&self, query: &str, candidates: Vec<Candidate>, k: usize) -> Result<Vec<Ranked>>;
}

/// A reranker with no model: scores by lexical token overlap with the query.
///
/// Used when no cross-encoder is configured; degrades gracefully to the
/// first `k` candidates in retrieval order if overlap cannot distinguish them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalOverlapReranker;

impl Reranker for LexicalOverlapReranker {
    fn rerank(&self, query: &str, candidates: Vec<Candidate>, k: usize) -> Result<Vec<Ranked>> {
        let query_terms: std::collections::HashSet<String> =
            query.to_lowercase().split_whitespace().map(str::to_string).collect();

        let mut ranked: Vec<Ranked> = candidates
            .into_iter()
            .map(|candidate| {
                let text_terms: std::collections::HashSet<String> =
                    candidate.text.to_lowercase().split_whitespace().map(str::to_string).collect();
                let overlap = query_terms.intersection(&text_terms).count();
                #[allow(clippy::cast_precision_loss)]
                let relevance_score = overlap as f64 + candidate.retrieval_score * 0.01;
                Ranked { candidate, relevance_score }
            })
            .collect();

        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        ranked.truncate(k);
        Ok(ranked)
    }
}
