//! Text extraction from dropped files.
//!
//! A registry maps file extension to an [`Extractor`]; an unknown extension
//! falls back to a degenerate extraction so the pipeline can still classify
//! on the filename alone.

use crate::error::{DocError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// The outcome of extracting a file: plain text plus its content hash and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Extracted plain text.
    pub text: String,
    /// SHA-256 hex digest of the raw file bytes.
    pub file_hash: String,
    /// Raw file size in bytes.
    pub size_bytes: u64,
}

/// Extracts text from a file given its path.
///
/// Implementations are pure with respect to file contents: they read but
/// never mutate the filesystem.
pub trait Extractor: Send + Sync {
    /// Extension(s) this extractor handles, lowercase, without the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Extracts text from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::ExtractError`] if the file cannot be read or parsed.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Plain-text extractor: reads the file as UTF-8 (lossily).
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["txt", "md", "rst", "adoc", "csv", "log", "json", "yaml", "yml", "toml", "xml", "html"]
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| DocError::ExtractError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Registry of extractors, dispatched by lowercase extension.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PlainTextExtractor));
        registry
    }
}

impl ExtractorRegistry {
    /// Creates a registry with no extractors registered.
    #[must_use]
    pub const fn empty() -> Self {
        Self { extractors: Vec::new() }
    }

    /// Registers an extractor for its declared extensions.
    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    fn find(&self, extension: &str) -> Option<&dyn Extractor> {
        self.extractors
            .iter()
            .find(|e| e.extensions().contains(&extension))
            .map(std::convert::AsRef::as_ref)
    }

    /// Extracts text, hash, and size for `path`.
    ///
    /// Unknown extensions get a degenerate extraction (`"File: <name>"`) so
    /// classification can still proceed on the filename.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::ExtractError`] if the file cannot be read or hashed.
    pub fn extract(&self, path: &Path) -> Result<Extracted> {
        let file_hash = hash_file(path)?;
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| DocError::ExtractError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
            .len();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let text = match self.find(&extension) {
            Some(extractor) => extractor.extract(path)?,
            None => {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");
                format!("File: {name}")
            }
        };

        Ok(Extracted { text, file_hash, size_bytes })
    }
}

/// Streams a file through SHA-256 without buffering it whole, for large files.
///
/// # Errors
///
/// Returns [`DocError::ExtractError`] if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| DocError::ExtractError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf).map_err(|e| DocError::ExtractError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
