//! Ingestion: extract, classify, sort, chunk, and index a dropped file.
//!
//! [`Ingestor::ingest`] runs the synchronous checkpointed pipeline over a
//! single path. [`IngestWorkerPool`] fans that out across a small `tokio`
//! task pool fed by an `mpsc` queue, mirroring the watcher's producer side.

use crate::chunking::AdaptiveChunker;
use crate::classify::{self, LLM_FALLBACK_THRESHOLD};
use crate::config::Config;
use crate::documents::{DocumentIndex, NewDocument};
use crate::embedding::Embedder;
use crate::error::{DocError, Result};
use crate::extract::ExtractorRegistry;
use crate::llm::LlmClient;
use crate::storage::SqliteStorage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Per-file metadata recorded in the auxiliary key-value store (§4.7 step 11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Extracted text size in megabytes.
    pub size_mb: f64,
    /// Number of chunks produced.
    pub chunks_count: usize,
    /// Classified domain.
    pub domain: String,
    /// Classified category.
    pub category: String,
    /// Unix timestamp the file was ingested.
    pub uploaded_at: i64,
    /// Content hash.
    pub file_hash: String,
}

/// Outcome of one ingestion task.
#[derive(Debug, Clone, Serialize)]
pub enum IngestStatus {
    /// The file was extracted, classified, sorted, and indexed.
    Indexed {
        /// Final sorted-relative path, forward-slash normalized.
        sorted_path: String,
        /// Classification result.
        classification: classify::Classification,
        /// Number of chunks produced.
        chunk_count: usize,
    },
    /// The file vanished before it could be processed.
    Missing,
    /// A step failed; the source file is left untouched for retry.
    Failed {
        /// Step-appropriate reason.
        reason: String,
    },
}

fn kv_file_hashes_key() -> &'static str {
    "file_hashes"
}

fn kv_file_metadata_key(file_hash: &str) -> String {
    format!("file_metadata:{file_hash}")
}

/// Runs the ingestion pipeline against storage, an embedder, an LLM fallback,
/// and a drop/sorted directory layout.
pub struct Ingestor<'a> {
    storage: &'a mut SqliteStorage,
    embedder: &'a dyn Embedder,
    llm: &'a dyn LlmClient,
    extractors: &'a ExtractorRegistry,
    chunker: AdaptiveChunker,
    config: &'a Config,
}

impl<'a> Ingestor<'a> {
    /// Creates a new ingestor bound to the given collaborators.
    pub fn new(
        storage: &'a mut SqliteStorage,
        embedder: &'a dyn Embedder,
        llm: &'a dyn LlmClient,
        extractors: &'a ExtractorRegistry,
        config: &'a Config,
    ) -> Self {
        Self { storage, embedder, llm, extractors, chunker: AdaptiveChunker::new(), config }
    }

    /// Runs the full ingestion pipeline over `source_path`.
    ///
    /// # Errors
    ///
    /// Never returns `Err` for ordinary failures (those are reported via
    /// [`IngestStatus::Failed`]); returns `Err` only if the underlying
    /// storage itself cannot be reached.
    pub fn ingest(&mut self, source_path: &Path) -> Result<IngestStatus> {
        // 1. Verify file still exists.
        if !source_path.exists() {
            return Ok(IngestStatus::Missing);
        }

        // 2. Compute file_hash.
        let extracted = match self.extractors.extract(source_path) {
            Ok(e) => e,
            Err(e) => return Ok(IngestStatus::Failed { reason: e.to_string() }),
        };

        // 3. Consult duplicate index; re-submission continues rather than skipping.
        let mut file_hashes: std::collections::HashMap<String, String> =
            self.storage.kv_get(kv_file_hashes_key())?.unwrap_or_default();

        // 4-5. Extract (done above) and classify.
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let mut classification = classify::classify_hierarchical(&extracted.text, &filename);
        if classification.confidence < LLM_FALLBACK_THRESHOLD {
            let prefix: String = extracted.text.chars().take(2000).collect();
            if let Ok(guess) = self.llm.classify(&prefix, &filename) {
                classification = classify::Classification {
                    domain: guess.domain,
                    category: guess.category,
                    confidence: 0.85,
                    ..classification
                };
            }
        }

        // 6. Build destination.
        let extension = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_lowercase();
        let mut dest_dir = self
            .config
            .sorted_root
            .join(&classification.domain)
            .join(&classification.category)
            .join(&extension);
        if self.config.time_based_sorting {
            dest_dir = dest_dir.join(current_year_month());
        }
        if let Err(e) = std::fs::create_dir_all(&dest_dir) {
            return Ok(IngestStatus::Failed {
                reason: format!("could not create destination directory: {e}"),
            });
        }

        let mut destination = dest_dir.join(&filename);
        let relative = pathdiff(&destination, &self.config.sorted_root);

        // 7. Overwrite semantics, or collision-resolved fallback filename.
        if destination.exists() {
            if let Some(stale) = match self.storage.get_document_by_filepath(&relative) {
                Ok(v) => v,
                Err(e) => return Ok(IngestStatus::Failed { reason: e.to_string() }),
            } {
                if let Err(e) = self.storage.delete_document(&stale.file_hash) {
                    return Ok(IngestStatus::Failed { reason: e.to_string() });
                }
            }
            if std::fs::remove_file(&destination).is_err() {
                destination = next_available_name(&destination);
            }
        }
        let relative = pathdiff(&destination, &self.config.sorted_root);

        // 8. Move source file to destination.
        if let Err(e) = std::fs::rename(source_path, &destination) {
            if std::fs::copy(source_path, &destination).is_err() {
                return Ok(IngestStatus::Failed {
                    reason: format!("could not move file into place: {e}"),
                });
            }
            let _ = std::fs::remove_file(source_path);
        }

        // 9-10. Chunk and index.
        let mut index = DocumentIndex::new(self.storage, self.embedder, &self.chunker);
        let document = match index.add(NewDocument {
            file_hash: extracted.file_hash.clone(),
            filepath: relative.clone(),
            filename: filename.clone(),
            domain: classification.domain.clone(),
            category: classification.category.clone(),
            confidence: classification.confidence,
            owner_id: None,
            text: &extracted.text,
        }) {
            Ok(d) => d,
            Err(e) => {
                return Ok(IngestStatus::Failed {
                    reason: DocError::IndexError {
                        path: relative.clone(),
                        reason: e.to_string(),
                    }
                    .to_string(),
                });
            }
        };

        // 11. Record file_hash -> destination, and per-file metadata.
        file_hashes.insert(extracted.file_hash.clone(), relative.clone());
        self.storage.kv_set(kv_file_hashes_key(), &file_hashes)?;
        #[allow(clippy::cast_precision_loss)]
        let size_mb = extracted.size_bytes as f64 / (1024.0 * 1024.0);
        self.storage.kv_set(
            &kv_file_metadata_key(&extracted.file_hash),
            &FileMetadata {
                size_mb,
                chunks_count: document.chunk_count,
                domain: classification.domain.clone(),
                category: classification.category.clone(),
                uploaded_at: document.ingested_at,
                file_hash: extracted.file_hash.clone(),
            },
        )?;

        // 12. Update any pending Upload record's sorted_path for this filename.
        self.storage.complete_pending_upload(&filename, &relative)?;

        Ok(IngestStatus::Indexed {
            sorted_path: relative,
            classification,
            chunk_count: document.chunk_count,
        })
    }
}

fn current_year_month() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let days = secs / 86_400;
    // Civil-from-days (Howard Hinnant's algorithm), good enough for a directory label.
    let z = days as i64 + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    format!("{y:04}-{m:02}")
}

fn pathdiff(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

fn next_available_name(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str());
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut n = 2;
    loop {
        let candidate_name =
            ext.map_or_else(|| format!("{stem}_{n}"), |ext| format!("{stem}_{n}.{ext}"));
        let candidate = parent.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// A task queued for an [`IngestWorkerPool`].
pub type IngestTask = PathBuf;

/// A bounded pool of ingestion workers fed by an `mpsc` queue.
///
/// Mirrors the teacher's optional `agent` feature's `tokio` runtime usage,
/// promoted here to drive the ingestion side of the pipeline.
pub struct IngestWorkerPool {
    sender: mpsc::UnboundedSender<IngestTask>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl IngestWorkerPool {
    /// Spawns `worker_count` tasks, each looping on the shared queue, calling
    /// `ingest_one` for every path received.
    pub fn spawn<F>(worker_count: usize, ingest_one: F) -> Self
    where
        F: Fn(PathBuf) + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel::<IngestTask>();
        let receiver = Arc::new(Mutex::new(receiver));
        let ingest_one = Arc::new(ingest_one);

        let handles = (0..worker_count.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                let ingest_one = Arc::clone(&ingest_one);
                tokio::spawn(async move {
                    loop {
                        let task = {
                            let mut guard = receiver.lock().await;
                            guard.recv().await
                        };
                        match task {
                            Some(path) => ingest_one(path),
                            None => break,
                        }
                    }
                })
            })
            .collect();

        Self { sender, handles }
    }

    /// Enqueues a path for ingestion.
    ///
    /// # Errors
    ///
    /// Returns an error if every worker has already shut down.
    pub fn enqueue(&self, path: PathBuf) -> Result<()> {
        self.sender
            .send(path)
            .map_err(|_| DocError::ModelUnavailable("ingest worker pool has shut down".to_string()).into())
    }

    /// Closes the queue and waits for all in-flight tasks to drain.
    pub async fn shutdown(self) {
        drop(self.sender);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}


impl std::fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexed { sorted_path, .. } => write!(f, "indexed -> {sorted_path}"),
            Self::Missing => write!(f, "missing"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}
