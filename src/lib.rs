//! # docflow
//!
//! A multi-user document ingestion and retrieval service.
//!
//! docflow watches a drop directory, extracts and classifies each file into a
//! domain/category, chunks it adaptively, indexes it for hybrid (BM25 +
//! semantic) search, and answers grounded questions over the result, filtered
//! by per-role access control. Everything upstream (HTTP surface, login,
//! chat history, analytics) is treated as an external collaborator; this
//! crate is the ingestion and retrieval engine underneath it.
//!
//! ## Features
//!
//! - **Classification**: Rule-based guardrails and keyword scoring with an
//!   optional LLM fallback for low-confidence documents
//! - **Adaptive chunking**: Multiple strategies (fixed, semantic, parallel)
//!   with size budgets tuned to document length
//! - **Hybrid search**: BM25 full-text search fused with semantic vector
//!   search via reciprocal rank fusion
//! - **`SQLite` storage**: Persistent state with transaction support and
//!   schema migrations
//! - **RBAC**: Role-scoped access to documents by domain and category
//! - **Filesystem watcher**: Debounced, recursive drop-directory ingestion
//! - **Memory mapping**: Efficient handling of large files
//! - **Unicode aware**: Proper grapheme cluster handling

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod auth;
pub mod chunking;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod documents;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod query;
pub mod rbac;
pub mod rerank;
pub mod search;
pub mod storage;
pub mod upload;
pub mod watcher;

pub mod io;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Buffer, BufferMetadata, Chunk, ChunkMetadata, Context, ContextValue};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, SqliteStorage, Storage};

// Re-export chunking types
pub use chunking::{
    AdaptiveChunker, Chunker, FixedChunker, SemanticChunker, available_strategies, create_chunker,
};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};

// Re-export embedding types
#[cfg(feature = "fastembed-embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{
    DEFAULT_DIMENSIONS, Embedder, FallbackEmbedder, cosine_similarity, create_embedder,
};

// Re-export search types
pub use search::{
    DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K, RrfConfig, SearchConfig, SearchResult,
    buffer_fully_embedded, embed_buffer_chunks, hybrid_search, reciprocal_rank_fusion, search_bm25,
    search_semantic, weighted_rrf,
};

// Re-export domain types
pub use classify::{Category, Classification, Domain, classify_hierarchical};
pub use config::Config;
pub use documents::{Document, DocumentIndex};
pub use rbac::{Role, access};
