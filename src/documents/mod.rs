//! The document-level vector store.
//!
//! A thin domain layer over [`crate::storage::SqliteStorage`]'s
//! buffer/chunk/embedding primitives, keyed by content hash instead of the
//! generic buffer ID, and exposing the add/query/get/delete/count contract
//! used by ingestion and querying.

use crate::chunking::Chunker;
use crate::core::Buffer;
use crate::embedding::Embedder;
use crate::error::{DocError, Result};
use crate::rbac::{self, Role};
use crate::search::{self, SearchConfig};
use crate::storage::{SqliteStorage, Storage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single ingested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// SHA-256 content hash, used as the primary key and dedup key.
    pub file_hash: String,
    /// Path relative to the drop directory.
    pub filepath: String,
    /// Base filename.
    pub filename: String,
    /// Classified domain.
    pub domain: String,
    /// Classified category.
    pub category: String,
    /// Classifier confidence in `[0.0, 1.0]`.
    pub confidence: f32,
    /// Owning user, if uploaded by an authenticated user.
    pub owner_id: Option<i64>,
    /// Backing buffer ID (holds the extracted text and its chunks).
    pub buffer_id: i64,
    /// Size of the extracted text in bytes.
    pub size_bytes: u64,
    /// Number of chunks produced.
    pub chunk_count: usize,
    /// Unix timestamp of ingestion.
    pub ingested_at: i64,
    /// Unix timestamp of the last update (re-ingest on content change).
    pub updated_at: i64,
}

/// A single query hit: chunk text plus distance and owning-document metadata.
#[derive(Debug, Clone)]
pub struct QueryHit {
    /// Chunk text.
    pub text: String,
    /// Owning document's file hash.
    pub file_hash: String,
    /// Owning document's domain.
    pub domain: String,
    /// Owning document's category.
    pub category: String,
    /// Owning document's filepath.
    pub filepath: String,
    /// Cosine distance (smaller is closer); absent when only BM25 matched.
    pub distance: Option<f32>,
}

/// A document to add to the index.
pub struct NewDocument<'a> {
    /// SHA-256 content hash.
    pub file_hash: String,
    /// Path relative to the drop directory.
    pub filepath: String,
    /// Base filename.
    pub filename: String,
    /// Classified domain.
    pub domain: String,
    /// Classified category.
    pub category: String,
    /// Classifier confidence.
    pub confidence: f32,
    /// Owning user, if any.
    pub owner_id: Option<i64>,
    /// Extracted plain text.
    pub text: &'a str,
}

/// Distance threshold beyond which a query hit is treated as a non-match.
pub const MAX_COSINE_DISTANCE: f32 = 1.3;

/// Outcome of a [`DocumentIndex::delete_file`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The file was unlinked, deindexed, and its upload record cleared.
    Done,
    /// No document matched `file_hash`.
    NotFound,
}

/// A persistent, metadata-filterable index of document chunks.
pub struct DocumentIndex<'a> {
    storage: &'a mut SqliteStorage,
    embedder: &'a dyn Embedder,
    chunker: &'a dyn Chunker,
}

impl<'a> DocumentIndex<'a> {
    /// Creates a new index view over `storage`.
    pub fn new(storage: &'a mut SqliteStorage, embedder: &'a dyn Embedder, chunker: &'a dyn Chunker) -> Self {
        Self { storage, embedder, chunker }
    }

    /// Adds (or re-adds, replacing the prior content) a document.
    ///
    /// Idempotent by `file_hash`: re-adding the same hash replaces the
    /// backing buffer and its chunks rather than duplicating them.
    ///
    /// # Errors
    ///
    /// Returns an error if chunking, embedding, or storage fails.
    pub fn add(&mut self, doc: NewDocument<'_>) -> Result<Document> {
        if let Some(existing) = self.storage.get_document(&doc.file_hash)? {
            return Ok(existing);
        }
        if let Some(stale) = self.storage.get_document_by_filepath(&doc.filepath)? {
            self.storage.delete_document(&stale.file_hash)?;
        }

        let buffer = Buffer::from_named(doc.filename.clone(), doc.text.to_string());
        let buffer_id = self.storage.add_buffer(&buffer)?;

        let chunks = self.chunker.chunk(buffer_id, doc.text, None)?;
        self.storage.add_chunks(buffer_id, &chunks)?;
        self.storage.stamp_chunk_document_meta(
            buffer_id,
            &doc.file_hash,
            &doc.domain,
            &doc.category,
            &doc.filepath,
        )?;
        search::embed_buffer_chunks(self.storage, self.embedder, buffer_id)?;

        let now = current_timestamp();
        let document = Document {
            file_hash: doc.file_hash,
            filepath: doc.filepath,
            filename: doc.filename,
            domain: doc.domain,
            category: doc.category,
            confidence: doc.confidence,
            owner_id: doc.owner_id,
            buffer_id,
            size_bytes: doc.text.len() as u64,
            chunk_count: chunks.len(),
            ingested_at: now,
            updated_at: now,
        };
        self.storage.upsert_document(&document)?;

        Ok(document)
    }

    /// Runs a hybrid search and resolves each hit's owning document metadata.
    ///
    /// Hits whose document metadata cannot be resolved (buffer chunks not
    /// yet stamped) are skipped rather than surfaced with missing context.
    ///
    /// # Errors
    ///
    /// Returns an error if the search itself fails.
    pub fn query(&self, text: &str, n: usize) -> Result<Vec<QueryHit>> {
        let config = SearchConfig::new().with_top_k(n);
        let results = search::hybrid_search(self.storage, self.embedder, text, &config)?;

        let mut hits = Vec::with_capacity(results.len());
        for result in results {
            let Some((file_hash, domain, category, filepath)) = self.resolve_meta(result.chunk_id)? else {
                continue;
            };
            let Some(chunk) = self.storage.get_chunk(result.chunk_id)? else {
                continue;
            };
            let distance = result.semantic_score.map(|s| 2.0 * (1.0 - s));
            if distance.is_some_and(|d| d > MAX_COSINE_DISTANCE) {
                continue;
            }
            hits.push(QueryHit {
                text: chunk.content,
                file_hash,
                domain,
                category,
                filepath,
                distance,
            });
        }
        Ok(hits)
    }

    fn resolve_meta(&self, chunk_id: i64) -> Result<Option<(String, String, String, String)>> {
        let Some((domain, category, filepath)) = self.storage.chunk_document_meta(chunk_id)? else {
            return Ok(None);
        };
        let Some(chunk) = self.storage.get_chunk(chunk_id)? else {
            return Ok(None);
        };
        let Some(doc) = self.storage.get_document_by_filepath(&filepath)? else {
            return Ok(None);
        };
        let _ = chunk.buffer_id;
        Ok(Some((doc.file_hash, domain, category, filepath)))
    }

    /// Retrieves a document by content hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, file_hash: &str) -> Result<Option<Document>> {
        self.storage.get_document(file_hash)
    }

    /// Retrieves a document by drop-directory-relative filepath.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_by_filepath(&self, filepath: &str) -> Result<Option<Document>> {
        self.storage.get_document_by_filepath(filepath)
    }

    /// Deletes a document (and its chunks/embeddings) by content hash.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub fn delete(&mut self, file_hash: &str) -> Result<bool> {
        self.storage.delete_document(file_hash)
    }

    /// Deletes an indexed document end to end, following the state machine
    /// `REQUESTED -> AUTHORIZED -> UNLINKED -> DEINDEXED -> TRACKER_CLEARED
    /// -> DONE`.
    ///
    /// Authorization requires `files.delete.all` (or the `*` wildcard), or
    /// `files.delete.own` with `requester_id` matching the file's owner, and
    /// domain-level RBAC (the file is already classified, so this is never
    /// the pending-upload case RBAC skips).
    ///
    /// `sorted_root` resolves the document's relative `filepath` to the file
    /// unlinked from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::AuthError`] if the caller lacks the required
    /// capability, [`DocError::AccessDenied`] if domain-level RBAC denies the
    /// document, or an error if the filesystem unlink or storage writes fail.
    pub fn delete_file(
        &mut self,
        role: &Role,
        requester_id: Option<i64>,
        file_hash: &str,
        sorted_root: &Path,
    ) -> Result<DeleteOutcome> {
        // REQUESTED
        let Some(document) = self.storage.get_document(file_hash)? else {
            return Ok(DeleteOutcome::NotFound);
        };
        let upload = self.storage.find_upload_by_sorted_path(&document.filepath)?;
        let owner_id = upload.and_then(|(_, uid)| uid).or(document.owner_id);

        // AUTHORIZED
        let has_all = rbac::has_capability(role, "files.delete.all");
        let has_own =
            rbac::has_capability(role, "files.delete.own") && requester_id.is_some() && requester_id == owner_id;
        if !has_all && !has_own {
            return Err(DocError::AuthError(format!(
                "role {} lacks files.delete.all/own for file {file_hash}",
                role.name
            ))
            .into());
        }
        if !rbac::access(role, &document.domain, &document.category) {
            return Err(DocError::AccessDenied {
                role: role.name.clone(),
                domain: document.domain.clone(),
                category: document.category.clone(),
            }
            .into());
        }

        // UNLINKED
        let absolute = sorted_root.join(&document.filepath);
        if absolute.exists() {
            std::fs::remove_file(&absolute)
                .map_err(|e| DocError::IndexError { path: document.filepath.clone(), reason: e.to_string() })?;
        }

        // DEINDEXED
        self.storage.delete_document(file_hash)?;

        // TRACKER_CLEARED
        if let Some((upload_id, _)) = upload {
            self.storage.delete_upload_record(upload_id)?;
        }

        // DONE
        Ok(DeleteOutcome::Done)
    }

    /// Lists all indexed documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self) -> Result<Vec<Document>> {
        self.storage.list_documents()
    }

    /// Returns the total number of indexed documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize> {
        self.storage.document_count()
    }
}

#[allow(clippy::cast_possible_wrap)]
fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::SemanticChunker;
    use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};

    fn setup() -> (SqliteStorage, FallbackEmbedder, SemanticChunker) {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        (storage, FallbackEmbedder::new(DEFAULT_DIMENSIONS), SemanticChunker::new())
    }

    #[test]
    fn add_then_get_round_trips() {
        let (mut storage, embedder, chunker) = setup();
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);

        let doc = index
            .add(NewDocument {
                file_hash: "abc123".to_string(),
                filepath: "intake/notes.txt".to_string(),
                filename: "notes.txt".to_string(),
                domain: "Healthcare".to_string(),
                category: "Clinical".to_string(),
                confidence: 0.9,
                owner_id: None,
                text: "The patient was admitted with a fever and prescribed medication.",
            })
            .unwrap();

        assert_eq!(doc.file_hash, "abc123");
        let fetched = index.get("abc123").unwrap().unwrap();
        assert_eq!(fetched.domain, "Healthcare");
        assert_eq!(index.count().unwrap(), 1);
    }

    #[test]
    fn add_is_idempotent_by_hash() {
        let (mut storage, embedder, chunker) = setup();
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);

        let new_doc = || NewDocument {
            file_hash: "same-hash".to_string(),
            filepath: "intake/a.txt".to_string(),
            filename: "a.txt".to_string(),
            domain: "Technology".to_string(),
            category: "Other".to_string(),
            confidence: 0.5,
            owner_id: None,
            text: "some content about technology systems",
        };

        index.add(new_doc()).unwrap();
        index.add(new_doc()).unwrap();
        assert_eq!(index.count().unwrap(), 1);
    }

    #[test]
    fn delete_removes_document_and_chunks() {
        let (mut storage, embedder, chunker) = setup();
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
        index
            .add(NewDocument {
                file_hash: "h1".to_string(),
                filepath: "intake/b.txt".to_string(),
                filename: "b.txt".to_string(),
                domain: "Technology".to_string(),
                category: "Other".to_string(),
                confidence: 0.5,
                owner_id: None,
                text: "technology content",
            })
            .unwrap();

        assert!(index.delete("h1").unwrap());
        assert!(index.get("h1").unwrap().is_none());
        assert_eq!(index.count().unwrap(), 0);
    }

    fn role(name: &str) -> Role {
        crate::rbac::builtin_roles().into_iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn delete_file_denies_without_capability_or_ownership() {
        let (mut storage, embedder, chunker) = setup();
        storage.seed_builtin_roles().unwrap();
        let owner = storage.create_user("owner", "Student", 0).unwrap();
        let other = storage.create_user("other", "Student", 0).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
        index
            .add(NewDocument {
                file_hash: "h1".to_string(),
                filepath: "intake/b.txt".to_string(),
                filename: "b.txt".to_string(),
                domain: "Technology".to_string(),
                category: "Other".to_string(),
                confidence: 0.5,
                owner_id: Some(owner),
                text: "technology content",
            })
            .unwrap();

        let student = role("Student");
        let result = index.delete_file(&student, Some(other), "h1", tmp.path());
        assert!(result.is_err());
        assert!(index.get("h1").unwrap().is_some());
    }

    #[test]
    fn delete_file_allows_owner_with_delete_own_capability() {
        let (mut storage, embedder, chunker) = setup();
        storage.seed_builtin_roles().unwrap();
        let owner = storage.create_user("owner", "Student", 0).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
        index
            .add(NewDocument {
                file_hash: "h1".to_string(),
                filepath: "intake/b.txt".to_string(),
                filename: "b.txt".to_string(),
                domain: "Technology".to_string(),
                category: "Other".to_string(),
                confidence: 0.5,
                owner_id: Some(owner),
                text: "technology content",
            })
            .unwrap();

        let student = role("Student");
        let outcome = index.delete_file(&student, Some(owner), "h1", tmp.path()).unwrap();
        assert_eq!(outcome, DeleteOutcome::Done);
        assert!(index.get("h1").unwrap().is_none());
    }

    #[test]
    fn delete_file_admin_wildcard_bypasses_ownership() {
        let (mut storage, embedder, chunker) = setup();
        storage.seed_builtin_roles().unwrap();
        let owner = storage.create_user("owner", "Doctor", 0).unwrap();
        let admin_user = storage.create_user("admin", "Admin", 0).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
        index
            .add(NewDocument {
                file_hash: "h1".to_string(),
                filepath: "intake/b.txt".to_string(),
                filename: "b.txt".to_string(),
                domain: "Healthcare".to_string(),
                category: "Clinical".to_string(),
                confidence: 0.5,
                owner_id: Some(owner),
                text: "patient content",
            })
            .unwrap();

        let admin = role("Admin");
        let outcome = index.delete_file(&admin, Some(admin_user), "h1", tmp.path()).unwrap();
        assert_eq!(outcome, DeleteOutcome::Done);
    }

    #[test]
    fn delete_file_missing_document_reports_not_found() {
        let (mut storage, embedder, chunker) = setup();
        let tmp = tempfile::tempdir().unwrap();
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
        let admin = role("Admin");
        let outcome = index.delete_file(&admin, Some(1), "missing", tmp.path()).unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }
}
