//! Grounded query pipeline: retrieve, filter by role, rerank, and answer.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::llm::LlmClient;
use crate::rbac::{self, Role};
use crate::rerank::{Candidate, Reranker};
use crate::storage::{SqliteStorage, Storage};
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::OnceLock;

/// Candidates retrieved for the initial kNN pass, before RBAC and rerank.
const RETRIEVAL_K: usize = 25;

/// Candidates kept after reranking.
const RERANK_K: usize = 5;

/// Relevance floor below which a reranked candidate is dropped as noise.
const NOISE_FLOOR: f64 = -5.0;

/// Fixed refusal phrases; an answer containing one is passed through as-is.
const REFUSAL_PHRASES: &[&str] =
    &["i don't know", "i do not know", "i cannot answer", "i can't answer", "no relevant information"];

fn filename_intent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[\w-]+\.[\w]+\b").expect("valid regex"))
}

const FILE_INTENT_KEYWORDS: &[&str] =
    &["give me", "show me", "full content", "entire file", "complete file", "whole file"];

const DEFINITION_KEYWORDS: &[&str] = &["what is", "define", "definition of", "meaning of"];

/// The result of running the query pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    /// The generated (or refused, or whole-file) answer.
    pub answer: String,
    /// Filenames cited in the answer's sources.
    pub cited_files: Vec<String>,
    /// Confidence in `[0.0, 100.0]`; `None` on refusal or access-denied.
    pub confidence_score: Option<f64>,
    /// Qualitative confidence label.
    pub confidence_label: Option<&'static str>,
    /// Text of the chunks actually used to ground the answer.
    pub source_snippets: Vec<String>,
    /// Best-effort detected query language (ISO 639-3 code, e.g. "eng").
    pub detected_language: String,
}

#[allow(clippy::cast_precision_loss)]
fn mean_f32(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

fn confidence_label(score: f64) -> &'static str {
    if score >= 75.0 {
        "HIGH"
    } else if score >= 40.0 {
        "MEDIUM"
    } else {
        "LOW"
    }
}

struct RetrievedChunk {
    chunk_id: i64,
    text: String,
    filename: String,
    domain: String,
    category: String,
    similarity: Option<f32>,
    distance: Option<f32>,
    retrieval_score: f64,
}

/// Runs the grounded query pipeline for `query_text` under `role`.
///
/// # Errors
///
/// Returns an error if storage access fails outright (not for ordinary
/// "no results"/"access denied" outcomes, which are reported in-band).
pub fn run(
    storage: &SqliteStorage,
    embedder: &dyn Embedder,
    reranker: &dyn Reranker,
    llm: &dyn LlmClient,
    query_text: &str,
    role: &Role,
) -> Result<QueryOutput> {
    let detected_language =
        whatlang::detect_lang(query_text).map_or_else(|| "eng".to_string(), |lang| lang.code().to_string());

    if let Some(answer) = whole_file_retrieval(storage, query_text)? {
        return Ok(QueryOutput {
            answer,
            cited_files: Vec::new(),
            confidence_score: Some(100.0),
            confidence_label: Some("HIGH"),
            source_snippets: Vec::new(),
            detected_language,
        });
    }

    let config = crate::search::SearchConfig::new().with_top_k(RETRIEVAL_K);
    let results = crate::search::hybrid_search(storage, embedder, query_text, &config)?;

    let mut candidates = Vec::with_capacity(results.len());
    for result in results {
        let distance = result.semantic_score.map(|s| 2.0 * (1.0 - s));
        if distance.is_some_and(|d| d > crate::documents::MAX_COSINE_DISTANCE) {
            continue;
        }
        let Some((domain, category, filepath)) = storage.chunk_document_meta(result.chunk_id)? else {
            continue;
        };
        let Some(chunk) = storage.get_chunk(result.chunk_id)? else {
            continue;
        };
        let filename = std::path::Path::new(&filepath)
            .file_name()
            .map_or_else(|| filepath.clone(), |n| n.to_string_lossy().into_owned());
        candidates.push(RetrievedChunk {
            chunk_id: result.chunk_id,
            text: chunk.content,
            filename,
            domain,
            category,
            similarity: result.semantic_score,
            distance,
            retrieval_score: result.score,
        });
    }

    let pre_filter_nonempty = !candidates.is_empty();
    let allowed: Vec<RetrievedChunk> =
        candidates.into_iter().filter(|c| rbac::access(role, &c.domain, &c.category)).collect();

    if allowed.is_empty() {
        if pre_filter_nonempty {
            return Ok(QueryOutput {
                answer: "Access denied: your role does not have permission to view the matching documents."
                    .to_string(),
                cited_files: Vec::new(),
                confidence_score: None,
                confidence_label: None,
                source_snippets: Vec::new(),
                detected_language,
            });
        }
        return Ok(QueryOutput {
            answer: "No relevant information was found for your question.".to_string(),
            cited_files: Vec::new(),
            confidence_score: None,
            confidence_label: None,
            source_snippets: Vec::new(),
            detected_language,
        });
    }

    let rerank_candidates: Vec<Candidate> = allowed
        .iter()
        .map(|c| Candidate { text: c.text.clone(), id: c.chunk_id, retrieval_score: c.retrieval_score })
        .collect();
    let mut ranked = reranker.rerank(query_text, rerank_candidates, RERANK_K)?;

    ranked.retain(|r| r.relevance_score > NOISE_FLOOR);
    if ranked.is_empty()
        && let Some(top) = reranker
            .rerank(
                query_text,
                allowed.iter().map(|c| Candidate { text: c.text.clone(), id: c.chunk_id, retrieval_score: c.retrieval_score }).collect(),
                1,
            )?
            .into_iter()
            .next()
    {
        ranked.push(top);
    }

    let by_id: std::collections::HashMap<i64, &RetrievedChunk> =
        allowed.iter().map(|c| (c.chunk_id, c)).collect();

    let mut prompt = String::new();
    prompt.push_str(&system_preamble(&detected_language, query_text));
    let mut cited_files = Vec::new();
    let mut source_snippets = Vec::new();
    let mut similarities = Vec::new();
    let mut distances = Vec::new();
    for (i, r) in ranked.iter().enumerate() {
        let Some(chunk) = by_id.get(&r.candidate.id) else { continue };
        let _ = write!(prompt, "\n[Source {}: {}]\n{}\n", i + 1, chunk.filename, chunk.text);
        cited_files.push(chunk.filename.clone());
        source_snippets.push(chunk.text.clone());
        if let Some(s) = chunk.similarity {
            similarities.push(s);
        }
        if let Some(d) = chunk.distance {
            distances.push(d);
        }
    }
    let _ = write!(prompt, "\nQuestion: {query_text}\n");

    let raw_answer = llm.answer(&prompt, query_text)?;

    if REFUSAL_PHRASES.iter().any(|p| raw_answer.to_lowercase().contains(p)) {
        return Ok(QueryOutput {
            answer: raw_answer,
            cited_files: Vec::new(),
            confidence_score: None,
            confidence_label: None,
            source_snippets: Vec::new(),
            detected_language,
        });
    }

    let mean_similarity = mean_f32(&similarities).map_or(0.5, f64::from);
    #[allow(clippy::cast_precision_loss)]
    let chunk_bonus = (ranked.len() as f64 / 5.0).min(1.0);
    let distance_confidence =
        mean_f32(&distances).map_or(0.5, |mean_distance| (1.0 - f64::from(mean_distance) / 2.0).max(0.0));
    let confidence =
        (100.0 * (0.4 * mean_similarity + 0.3 * chunk_bonus + 0.3 * distance_confidence)).clamp(0.0, 100.0);

    let mut answer = raw_answer;
    let _ = write!(answer, "\n\nConfidence: {:.0}% ({})", confidence, confidence_label(confidence));
    if !cited_files.is_empty() {
        let _ = write!(answer, "\nSources: {}", cited_files.join(", "));
    }

    Ok(QueryOutput {
        answer,
        cited_files,
        confidence_score: Some(confidence),
        confidence_label: Some(confidence_label(confidence)),
        source_snippets,
        detected_language,
    })
}

fn whole_file_retrieval(storage: &SqliteStorage, query_text: &str) -> Result<Option<String>> {
    let lower = query_text.to_lowercase();
    if !FILE_INTENT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return Ok(None);
    }
    let Some(m) = filename_intent_regex().find(query_text) else {
        return Ok(None);
    };
    let token = m.as_str();

    for doc in storage.list_documents()? {
        if doc.filename == token || doc.filepath.ends_with(token) {
            let mut chunks = storage.get_chunks(doc.buffer_id)?;
            chunks.sort_by_key(|c| c.index);
            let text = chunks.into_iter().map(|c| c.content).collect::<Vec<_>>().join("\n");
            return Ok(Some(text));
        }
    }
    Ok(None)
}

fn system_preamble(language: &str, query_text: &str) -> String {
    let lower = query_text.to_lowercase();
    let mut preamble = format!(
        "You are a grounded assistant (query language: {language}). Answer strictly from the sources \
         below. If the sources do not contain the answer, say you don't know. Do not invent facts.\n"
    );
    if DEFINITION_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        preamble.push_str("Begin with a 1-2 line definition before any further detail.\n");
    }
    preamble
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{DocumentIndex, NewDocument};
    use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
    use crate::llm::StubLlmClient;
    use crate::rbac::builtin_roles;
    use crate::rerank::LexicalOverlapReranker;

    fn setup() -> (SqliteStorage, FallbackEmbedder) {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        (storage, FallbackEmbedder::new(DEFAULT_DIMENSIONS))
    }

    #[test]
    fn rbac_filter_blocks_denied_domain() {
        let (mut storage, embedder) = setup();
        let chunker = crate::chunking::AdaptiveChunker::new();
        {
            let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
            index
                .add(NewDocument {
                    file_hash: "h1".to_string(),
                    filepath: "Finance/Accounting/txt/ledger.txt".to_string(),
                    filename: "ledger.txt".to_string(),
                    domain: "Finance".to_string(),
                    category: "Accounting".to_string(),
                    confidence: 0.9,
                    owner_id: None,
                    text: "quarterly ledger accounting totals for finance review",
                })
                .unwrap();
        }

        let student = builtin_roles().into_iter().find(|r| r.name == "Student").unwrap();
        let reranker = LexicalOverlapReranker;
        let llm = StubLlmClient;
        let output =
            run(&storage, &embedder, &reranker, &llm, "quarterly ledger accounting totals", &student).unwrap();
        assert!(output.answer.to_lowercase().contains("access denied"));
    }

    #[test]
    fn allowed_domain_produces_grounded_answer() {
        let (mut storage, embedder) = setup();
        let chunker = crate::chunking::AdaptiveChunker::new();
        {
            let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
            index
                .add(NewDocument {
                    file_hash: "h2".to_string(),
                    filepath: "Technology/Other/txt/notes.txt".to_string(),
                    filename: "notes.txt".to_string(),
                    domain: "Technology".to_string(),
                    category: "Other".to_string(),
                    confidence: 0.9,
                    owner_id: None,
                    text: "the rust compiler enforces ownership rules at compile time",
                })
                .unwrap();
        }

        let student = builtin_roles().into_iter().find(|r| r.name == "Student").unwrap();
        let reranker = LexicalOverlapReranker;
        let llm = StubLlmClient;
        let output = run(&storage, &embedder, &reranker, &llm, "ownership rules compile time", &student).unwrap();
        assert!(output.confidence_score.is_some());
        assert!(!output.cited_files.is_empty());
    }
}
