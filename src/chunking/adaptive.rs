//! Adaptive chunking: picks a chunk-size preset based on source length.
//!
//! Small files stay in a single chunk where possible, medium files use the
//! default semantic preset, and large files use a wider window so chunk
//! counts stay tractable for hybrid search and grounded prompt assembly.

use crate::chunking::MAX_CHUNK_SIZE;
use crate::chunking::semantic::SemanticChunker;
use crate::chunking::traits::{ChunkMetadata, Chunker};
use crate::core::Chunk;
use crate::error::Result;

/// Byte threshold below which the small preset applies (1 MB).
pub const SMALL_THRESHOLD: usize = 1_000_000;

/// Byte threshold below which the medium preset applies (10 MB).
pub const MEDIUM_THRESHOLD: usize = 10_000_000;

/// Chunks text by wrapping [`SemanticChunker`] with a size preset chosen
/// from the input length, rather than a single fixed size for every input.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveChunker;

impl AdaptiveChunker {
    /// Creates a new adaptive chunker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn preset_for(len: usize) -> SemanticChunker {
        if len < SMALL_THRESHOLD {
            // Widest budget the chunker allows, so small files stay in one
            // chunk whenever their content fits under the hard cap.
            SemanticChunker::with_size_and_overlap(MAX_CHUNK_SIZE, 0)
        } else if len < MEDIUM_THRESHOLD {
            SemanticChunker::new()
        } else {
            SemanticChunker::with_size_and_overlap(6_000, 500)
        }
    }
}

impl Chunker for AdaptiveChunker {
    fn chunk(&self, buffer_id: i64, text: &str, metadata: Option<&ChunkMetadata>) -> Result<Vec<Chunk>> {
        Self::preset_for(text.len()).chunk(buffer_id, text, metadata)
    }

    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn description(&self) -> &'static str {
        "Semantic chunking with a size preset chosen from the input length"
    }
}
