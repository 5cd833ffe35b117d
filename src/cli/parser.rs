//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docflow: document ingestion, classification, and grounded retrieval.
#[derive(Parser, Debug)]
#[command(name = "docflow")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the docflow database file.
    ///
    /// Defaults to `.docflow/docflow-state.db` in the current directory.
    #[arg(short, long, env = "DOCFLOW_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the docflow database.
    ///
    /// Creates the database file, schema, and built-in role table if they
    /// don't exist.
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Show current docflow state status.
    Status,

    /// Reset docflow state (delete all data).
    Reset {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run the full ingestion pipeline over a single path.
    ///
    /// Extracts, classifies, sorts into `<sorted-root>/<Domain>/<Category>/<ext>`,
    /// chunks, and indexes the file.
    Ingest {
        /// Path to the file to ingest.
        path: PathBuf,

        /// Root directory sorted files are moved into.
        #[arg(long, default_value = "./sorted")]
        sorted_root: PathBuf,

        /// Nest sorted files under a `YYYY-MM` directory.
        #[arg(long)]
        time_based_sorting: bool,
    },

    /// Watch a drop directory, ingesting created files and pruning deleted ones.
    ///
    /// Runs until interrupted.
    Watch {
        /// Directory to watch for incoming files.
        drop_dir: PathBuf,

        /// Root directory sorted files are moved into.
        #[arg(long, default_value = "./sorted")]
        sorted_root: PathBuf,

        /// Number of concurrent ingestion workers.
        #[arg(long, default_value = "2")]
        workers: usize,

        /// Seconds to wait after a file-created event before ingesting.
        #[arg(long, default_value = "2")]
        settle_seconds: u64,

        /// Seconds between prune sweeps of documents whose file vanished.
        #[arg(long, default_value = "60")]
        prune_interval_seconds: u64,
    },

    /// Run the grounded query pipeline against indexed documents.
    Query {
        /// Question text.
        text: String,

        /// Role the caller is acting as (determines which documents are visible).
        #[arg(long, default_value = "Admin")]
        role: String,
    },

    /// Classify text or a file without ingesting it.
    Classify {
        /// Path to a file to classify (mutually exclusive with `--text`).
        path: Option<PathBuf>,

        /// Raw text to classify in place of a file.
        #[arg(long)]
        text: Option<String>,

        /// Filename to classify against, when using `--text`.
        #[arg(long, default_value = "input.txt")]
        filename: String,
    },

    /// Accept an upload into a drop directory, enforcing quota and size caps.
    Upload {
        /// Username the upload is attributed to.
        username: String,

        /// Path to the file being uploaded.
        file: PathBuf,

        /// Drop directory the file is copied into.
        #[arg(long, default_value = "./incoming")]
        drop_dir: PathBuf,
    },

    /// File listing and deletion.
    #[command(subcommand)]
    Files(FileCommands),

    /// Role administration.
    #[command(subcommand)]
    Roles(RoleCommands),

    /// User administration.
    #[command(subcommand)]
    Users(UserCommands),
}

/// File-level subcommands.
#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// List indexed documents.
    List,

    /// Delete an indexed document or a still-pending upload.
    Delete {
        /// Content hash of an indexed document, or the numeric ID of a
        /// pending upload (not yet ingested).
        identifier: String,

        /// Role the caller is acting as.
        #[arg(long, default_value = "Admin")]
        role: String,

        /// User ID making the request (for ownership checks).
        #[arg(long)]
        requester: Option<i64>,

        /// Root directory sorted files live under.
        #[arg(long, default_value = "./sorted")]
        sorted_root: PathBuf,
    },
}

/// Role-level subcommands.
#[derive(Subcommand, Debug)]
pub enum RoleCommands {
    /// Seed the built-in role table (no-op if roles already exist).
    Seed,

    /// List all roles.
    List,

    /// Show a single role.
    Show {
        /// Role name.
        name: String,
    },

    /// Delete a custom (non-built-in) role.
    Delete {
        /// Role name.
        name: String,
    },
}

/// User-level subcommands.
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user.
    Add {
        /// Username.
        username: String,

        /// Role name.
        role: String,

        /// Upload quota in bytes (0 for role-default handling).
        #[arg(long, default_value = "0")]
        quota_bytes: u64,
    },

    /// List all users.
    List,

    /// Delete a user by ID.
    Delete {
        /// User ID.
        id: i64,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        // Test that CLI can be created
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_db_path() {
        let cli = Cli {
            db_path: None,
            verbose: false,
            format: "text".to_string(),
            command: Commands::Status,
        };
        assert_eq!(
            cli.get_db_path(),
            PathBuf::from(crate::storage::DEFAULT_DB_PATH)
        );
    }

    #[test]
    fn test_custom_db_path() {
        let cli = Cli {
            db_path: Some(PathBuf::from("/custom/path.db")),
            verbose: false,
            format: "text".to_string(),
            command: Commands::Status,
        };
        assert_eq!(cli.get_db_path(), PathBuf::from("/custom/path.db"));
    }
}
