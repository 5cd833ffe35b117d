//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::auth::User;
use crate::classify::Classification;
use crate::documents::Document;
use crate::ingest::IngestStatus;
use crate::query::QueryOutput;
use crate::rbac::Role;
use crate::storage::traits::StorageStats;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON (NDJSON) for streaming.
    /// Each record is a single JSON object on its own line.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" | "stream" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Returns true if this format is a streaming format.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Ndjson)
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StorageStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(stats),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(stats),
    }
}

fn format_status_text(stats: &StorageStats) -> String {
    let mut output = String::new();
    output.push_str("docflow Status\n");
    output.push_str("==============\n\n");
    let _ = writeln!(output, "  Documents:     {}", stats.buffer_count);
    let _ = writeln!(output, "  Chunks:        {}", stats.chunk_count);
    let _ = writeln!(
        output,
        "  Content size:  {} bytes",
        stats.total_content_size
    );
    let _ = writeln!(output, "  Schema:        v{}", stats.schema_version);
    if let Some(size) = stats.db_size {
        let _ = writeln!(output, "  DB size:       {size} bytes");
    }
    output
}

/// Formats an ingestion outcome.
#[must_use]
pub fn format_ingest_status(status: &IngestStatus, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => match status {
            IngestStatus::Indexed { sorted_path, classification, chunk_count } => format!(
                "Ingested -> {sorted_path}\n  domain:     {}\n  category:   {}\n  confidence: {:.2}\n  chunks:     {chunk_count}\n",
                classification.domain, classification.category, classification.confidence
            ),
            IngestStatus::Missing => "File no longer exists; nothing to ingest.\n".to_string(),
            IngestStatus::Failed { reason } => format!("Ingestion failed: {reason}\n"),
        },
        OutputFormat::Json | OutputFormat::Ndjson => format_json(status),
    }
}

/// Formats a classification result.
#[must_use]
pub fn format_classification(classification: &Classification, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "domain:         {}\ncategory:       {}\nextension:      {}\nconfidence:     {:.2}\ndomain_score:   {}\ncategory_score: {}\nforced:         {}\n",
            classification.domain,
            classification.category,
            classification.extension,
            classification.confidence,
            classification.domain_score,
            classification.category_score,
            classification.forced
        ),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(classification),
    }
}

/// Formats a query pipeline result.
#[must_use]
pub fn format_query_output(output: &QueryOutput, format: OutputFormat) -> String {
    match format {
        // `output.answer` already carries its own confidence/sources trailer
        // when the pipeline grounded it (see query::run); nothing to add.
        OutputFormat::Text => format!("{}\n", output.answer),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(output),
    }
}

/// Formats a list of indexed documents.
#[must_use]
pub fn format_document_list(documents: &[Document], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if documents.is_empty() {
                return "No documents found.\n".to_string();
            }
            let mut output = String::new();
            let _ = writeln!(output, "{:<12} {:<16} {:<16} {:<8} Path", "Hash", "Domain", "Category", "Chunks");
            output.push_str(&"-".repeat(70));
            output.push('\n');
            for doc in documents {
                let _ = writeln!(
                    output,
                    "{:<12} {:<16} {:<16} {:<8} {}",
                    truncate(&doc.file_hash, 12),
                    truncate(&doc.domain, 16),
                    truncate(&doc.category, 16),
                    doc.chunk_count,
                    doc.filepath
                );
            }
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson => format_json(&documents),
    }
}

/// Formats a list of roles.
#[must_use]
pub fn format_role_list(roles: &[Role], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if roles.is_empty() {
                return "No roles found.\n".to_string();
            }
            let mut output = String::new();
            for role in roles {
                let _ = writeln!(output, "{} - {}", role.name, role.description);
            }
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson => format_json(&roles),
    }
}

/// Formats a single role.
#[must_use]
pub fn format_role(role: &Role, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "name:        {}\ndescription: {}\ndomains:     {:?}\ncategories:  {:?}\ndenied:      {:?}\nbuiltin:     {}\n",
            role.name, role.description, role.allowed_domains, role.allowed_categories, role.denied_categories, role.is_builtin
        ),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(role),
    }
}

/// Formats a list of users.
#[must_use]
pub fn format_user_list(users: &[User], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if users.is_empty() {
                return "No users found.\n".to_string();
            }
            let mut output = String::new();
            let _ = writeln!(output, "{:<6} {:<20} {:<12} Quota", "ID", "Username", "Role");
            output.push_str(&"-".repeat(50));
            output.push('\n');
            for user in users {
                let _ = writeln!(output, "{:<6} {:<20} {:<12} {}", user.id, user.username, user.role, user.quota_bytes);
            }
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson => format_json(&users),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an error for output.
///
/// When format is JSON, returns a structured error object.
/// When format is Text, returns the error message string.
#[must_use]
pub fn format_error(error: &crate::Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let (error_type, suggestion) = get_error_details(error);
            let json = serde_json::json!({
                "success": false,
                "error": {
                    "type": error_type,
                    "message": error.to_string(),
                    "suggestion": suggestion
                }
            });
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Extracts error type and recovery suggestion from an error.
const fn get_error_details(error: &crate::Error) -> (&'static str, Option<&'static str>) {
    use crate::error::{ChunkingError, CommandError, DocError, IoError, StorageError};

    match error {
        crate::Error::Storage(e) => match e {
            StorageError::NotInitialized => (
                "NotInitialized",
                Some("Run 'docflow init' to initialize the database"),
            ),
            StorageError::BufferNotFound { .. } => (
                "BufferNotFound",
                Some("Run 'docflow files list' to see available documents"),
            ),
            StorageError::ChunkNotFound { .. } => ("ChunkNotFound", None),
            StorageError::ContextNotFound => ("ContextNotFound", Some("Context not yet created")),
            StorageError::Database(_) => ("DatabaseError", None),
            StorageError::Migration(_) => ("MigrationError", None),
            StorageError::Transaction(_) => ("TransactionError", None),
            StorageError::Serialization(_) => ("SerializationError", None),
            #[cfg(feature = "usearch-hnsw")]
            StorageError::VectorSearch(_) => ("VectorSearchError", None),
            #[cfg(feature = "fastembed-embeddings")]
            StorageError::Embedding(_) => {
                ("EmbeddingError", Some("Check disk space and try again"))
            }
        },
        crate::Error::Io(e) => match e {
            IoError::FileNotFound { .. } => ("FileNotFound", Some("Verify the file path exists")),
            IoError::ReadFailed { .. } => ("ReadError", None),
            IoError::WriteFailed { .. } => ("WriteError", None),
            IoError::MmapFailed { .. } => ("MemoryMapError", None),
            IoError::DirectoryFailed { .. } => ("DirectoryError", None),
            IoError::PathTraversal { .. } => (
                "PathTraversalDenied",
                Some("Path traversal outside allowed directory is not permitted"),
            ),
            IoError::Generic(_) => ("IoError", None),
        },
        crate::Error::Chunking(e) => match e {
            ChunkingError::InvalidUtf8 { .. } => ("InvalidUtf8", None),
            ChunkingError::ChunkTooLarge { .. } => {
                ("ChunkTooLarge", Some("Use a smaller --chunk-size value"))
            }
            ChunkingError::InvalidConfig { .. } => ("InvalidConfig", None),
            ChunkingError::OverlapTooLarge { .. } => (
                "OverlapTooLarge",
                Some("Overlap must be less than chunk size"),
            ),
            ChunkingError::ParallelFailed { .. } => ("ParallelError", None),
            ChunkingError::SemanticFailed(_) => ("SemanticError", None),
            ChunkingError::Regex(_) => ("RegexError", None),
            ChunkingError::UnknownStrategy { .. } => (
                "UnknownStrategy",
                Some("Valid strategies: fixed, semantic, parallel"),
            ),
        },
        crate::Error::Command(e) => match e {
            CommandError::UnknownCommand(_) => ("UnknownCommand", None),
            CommandError::InvalidArgument(_) => ("InvalidArgument", None),
            CommandError::MissingArgument(_) => ("MissingArgument", None),
            CommandError::ExecutionFailed(_) => ("ExecutionFailed", None),
            CommandError::Cancelled => ("Cancelled", None),
            CommandError::OutputFormat(_) => ("OutputFormatError", None),
        },
        crate::Error::Document(e) => match e {
            DocError::ExtractError { .. } => ("ExtractError", None),
            DocError::ClassifyError { .. } => ("ClassifyError", None),
            DocError::IndexError { .. } => ("IndexError", None),
            DocError::AuthError(_) => ("AuthError", Some("Check the bearer token or role name")),
            DocError::AccessDenied { .. } => ("AccessDenied", None),
            DocError::QuotaExceeded { .. } => ("QuotaExceeded", None),
            DocError::NotFound(_) => ("NotFound", None),
            DocError::Conflict(_) => ("Conflict", None),
            DocError::ModelUnavailable(_) => ("ModelUnavailable", None),
        },
        crate::Error::InvalidState { .. } => ("InvalidState", None),
        crate::Error::Config { .. } => ("ConfigError", None),
    }
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s[..max_len].to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("unknown"), OutputFormat::Text);
    }

    #[test]
    fn test_output_format_ndjson() {
        assert_eq!(OutputFormat::parse("ndjson"), OutputFormat::Ndjson);
        assert_eq!(OutputFormat::parse("NDJSON"), OutputFormat::Ndjson);
        assert_eq!(OutputFormat::parse("jsonl"), OutputFormat::Ndjson);
        assert_eq!(OutputFormat::parse("stream"), OutputFormat::Ndjson);
        assert!(OutputFormat::Ndjson.is_streaming());
        assert!(!OutputFormat::Json.is_streaming());
        assert!(!OutputFormat::Text.is_streaming());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Hello", 3), "Hel");
        assert_eq!(truncate("Hello", 1), "H");
    }

    #[test]
    fn test_format_status() {
        let stats = StorageStats {
            buffer_count: 2,
            chunk_count: 10,
            total_content_size: 1024,
            has_context: true,
            schema_version: 1,
            db_size: Some(4096),
        };

        let text = format_status(&stats, OutputFormat::Text);
        assert!(text.contains("Documents:     2"));
        assert!(text.contains("Chunks:        10"));
        assert!(text.contains("DB size:"));

        let json = format_status(&stats, OutputFormat::Json);
        assert!(json.contains("\"buffer_count\": 2"));
    }

    #[test]
    fn test_format_status_no_db_size() {
        let stats = StorageStats {
            buffer_count: 0,
            chunk_count: 0,
            total_content_size: 0,
            has_context: false,
            schema_version: 1,
            db_size: None,
        };

        let text = format_status(&stats, OutputFormat::Text);
        assert!(!text.contains("DB size:"));
    }

    #[test]
    fn test_format_classification() {
        let classification = Classification {
            domain: "Technology".to_string(),
            category: "Other".to_string(),
            extension: "txt".to_string(),
            confidence: 0.5,
            domain_score: 10,
            category_score: 0,
            forced: false,
        };
        let text = format_classification(&classification, OutputFormat::Text);
        assert!(text.contains("domain:         Technology"));

        let json = format_classification(&classification, OutputFormat::Json);
        assert!(json.contains("\"domain\""));
    }

    #[test]
    fn test_format_document_list_empty() {
        let documents: Vec<Document> = vec![];
        let text = format_document_list(&documents, OutputFormat::Text);
        assert!(text.contains("No documents found"));

        let json = format_document_list(&documents, OutputFormat::Json);
        assert!(json.contains("[]"));
    }

    #[test]
    fn test_format_query_output_text_passes_answer_through() {
        let output = QueryOutput {
            answer: "Relevant answer.\n\nConfidence: 80% (HIGH)\nSources: a.txt".to_string(),
            cited_files: vec!["a.txt".to_string()],
            confidence_score: Some(80.0),
            confidence_label: Some("HIGH"),
            source_snippets: vec![],
            detected_language: "eng".to_string(),
        };
        let text = format_query_output(&output, OutputFormat::Text);
        assert_eq!(text, format!("{}\n", output.answer));

        let json = format_query_output(&output, OutputFormat::Json);
        assert!(json.contains("\"confidence_score\""));
    }

    #[test]
    fn test_format_user_list_empty() {
        let users: Vec<User> = vec![];
        let text = format_user_list(&users, OutputFormat::Text);
        assert!(text.contains("No users found"));
    }
}
