//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

// Allow style choices for clarity
#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::option_if_let_else)]

use crate::auth::User;
use crate::cli::output::{
    OutputFormat, format_classification, format_document_list, format_ingest_status,
    format_query_output, format_role, format_role_list, format_status, format_user_list,
};
use crate::cli::parser::{Cli, Commands, FileCommands, RoleCommands, UserCommands};
use crate::config::Config;
use crate::documents::{DeleteOutcome, DocumentIndex};
use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
use crate::error::{CommandError, DocError, Result, StorageError};
use crate::extract::ExtractorRegistry;
use crate::ingest::Ingestor;
use crate::llm::StubLlmClient;
use crate::rbac::Role;
use crate::rerank::LexicalOverlapReranker;
use crate::storage::{SqliteStorage, Storage};
use crate::upload::{UploadLimits, UploadTracker};
use std::path::Path;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Status => cmd_status(&db_path, format),
        Commands::Reset { yes } => cmd_reset(&db_path, *yes, format),
        Commands::Ingest { path, sorted_root, time_based_sorting } => {
            cmd_ingest(&db_path, path, sorted_root, *time_based_sorting, format)
        }
        Commands::Watch { drop_dir, sorted_root, workers, settle_seconds, prune_interval_seconds } => {
            cmd_watch(&db_path, drop_dir, sorted_root, *workers, *settle_seconds, *prune_interval_seconds)
        }
        Commands::Query { text, role } => cmd_query(&db_path, text, role, format),
        Commands::Classify { path, text, filename } => {
            cmd_classify(path.as_deref(), text.as_deref(), filename, format)
        }
        Commands::Upload { username, file, drop_dir } => {
            cmd_upload(&db_path, username, file, drop_dir, format)
        }
        Commands::Files(cmd) => match cmd {
            FileCommands::List => cmd_files_list(&db_path, format),
            FileCommands::Delete { identifier, role, requester, sorted_root } => {
                cmd_files_delete(&db_path, identifier, role, *requester, sorted_root, format)
            }
        },
        Commands::Roles(cmd) => match cmd {
            RoleCommands::Seed => cmd_roles_seed(&db_path, format),
            RoleCommands::List => cmd_roles_list(&db_path, format),
            RoleCommands::Show { name } => cmd_roles_show(&db_path, name, format),
            RoleCommands::Delete { name } => cmd_roles_delete(&db_path, name, format),
        },
        Commands::Users(cmd) => match cmd {
            UserCommands::Add { username, role, quota_bytes } => {
                cmd_users_add(&db_path, username, role, *quota_bytes, format)
            }
            UserCommands::List => cmd_users_list(&db_path, format),
            UserCommands::Delete { id } => cmd_users_delete(&db_path, *id, format),
        },
    }
}

/// Opens storage and ensures it's initialized.
fn open_storage(db_path: &std::path::Path) -> Result<SqliteStorage> {
    let storage = SqliteStorage::open(db_path)?;

    if !storage.is_initialized()? {
        return Err(StorageError::NotInitialized.into());
    }

    Ok(storage)
}

/// Resolves a role by name: a custom role persisted in storage takes
/// precedence over a built-in of the same name.
fn resolve_role(storage: &SqliteStorage, name: &str) -> Result<Role> {
    if let Some(role) = storage.get_role(name)? {
        return Ok(role);
    }
    crate::rbac::builtin_roles()
        .into_iter()
        .find(|r| r.name == name)
        .ok_or_else(|| DocError::NotFound(format!("role {name}")).into())
}

// ==================== Command Implementations ====================

fn cmd_init(db_path: &std::path::Path, force: bool, _format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if let Some(parent) = db_path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to create directory: {e}"))
        })?;
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
    }

    let mut storage = SqliteStorage::open(db_path)?;
    storage.init()?;
    storage.seed_builtin_roles()?;

    Ok(format!("Initialized docflow database at: {}\n", db_path.display()))
}

fn cmd_status(db_path: &std::path::Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let stats = storage.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_reset(db_path: &std::path::Path, yes: bool, _format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm reset. This will delete all data.".to_string(),
        )
        .into());
    }

    let mut storage = open_storage(db_path)?;
    storage.reset()?;
    storage.seed_builtin_roles()?;

    Ok("docflow state reset successfully.\n".to_string())
}

fn cmd_ingest(
    db_path: &std::path::Path,
    path: &Path,
    sorted_root: &Path,
    time_based_sorting: bool,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
    let llm = StubLlmClient;
    let extractors = ExtractorRegistry::default();
    let config = Config { sorted_root: sorted_root.to_path_buf(), time_based_sorting, ..Config::default() };

    let mut ingestor = Ingestor::new(&mut storage, &embedder, &llm, &extractors, &config);
    let status = ingestor.ingest(path)?;
    Ok(format_ingest_status(&status, format))
}

fn cmd_watch(
    db_path: &std::path::Path,
    drop_dir: &Path,
    sorted_root: &Path,
    workers: usize,
    settle_seconds: u64,
    prune_interval_seconds: u64,
) -> Result<String> {
    std::fs::create_dir_all(drop_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("could not create drop directory: {e}"))
    })?;
    std::fs::create_dir_all(sorted_root).map_err(|e| {
        CommandError::ExecutionFailed(format!("could not create sorted root: {e}"))
    })?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CommandError::ExecutionFailed(format!("could not start async runtime: {e}")))?;

    runtime.block_on(async {
        run_watch_loop(db_path, drop_dir, sorted_root, workers, settle_seconds, prune_interval_seconds).await
    })?;

    Ok(String::new())
}

async fn run_watch_loop(
    db_path: &std::path::Path,
    drop_dir: &Path,
    sorted_root: &Path,
    workers: usize,
    settle_seconds: u64,
    prune_interval_seconds: u64,
) -> Result<()> {
    use crate::watcher::{DropDirWatcher, WatchEvent, handle_deleted, prune_sweep};
    use std::time::Duration;

    let mut watcher = DropDirWatcher::start(drop_dir, Duration::from_secs(settle_seconds))?;
    let db_path = db_path.to_path_buf();
    let sorted_root = sorted_root.to_path_buf();
    let config = Config {
        sorted_root: sorted_root.clone(),
        worker_count: workers,
        ..Config::default()
    };

    let mut prune_interval = tokio::time::interval(Duration::from_secs(prune_interval_seconds));

    loop {
        tokio::select! {
            event = watcher.recv() => {
                match event {
                    Some(WatchEvent::Created(path)) => {
                        let db_path = db_path.clone();
                        let config = config.clone();
                        tokio::task::spawn_blocking(move || {
                            if let Ok(mut storage) = SqliteStorage::open(&db_path) {
                                let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
                                let llm = StubLlmClient;
                                let extractors = ExtractorRegistry::default();
                                let mut ingestor = Ingestor::new(&mut storage, &embedder, &llm, &extractors, &config);
                                let _ = ingestor.ingest(&path);
                            }
                        });
                    }
                    Some(WatchEvent::Deleted(path)) => {
                        let db_path = db_path.clone();
                        let sorted_root = sorted_root.clone();
                        tokio::task::spawn_blocking(move || {
                            if let Ok(mut storage) = SqliteStorage::open(&db_path) {
                                let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
                                let _ = handle_deleted(&mut storage, &embedder, &path, &sorted_root);
                            }
                        });
                    }
                    None => break,
                }
            }
            _ = prune_interval.tick() => {
                let db_path = db_path.clone();
                let sorted_root = sorted_root.clone();
                tokio::task::spawn_blocking(move || {
                    if let Ok(mut storage) = SqliteStorage::open(&db_path) {
                        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
                        let _ = prune_sweep(&mut storage, &embedder, &sorted_root);
                    }
                });
            }
        }
    }

    Ok(())
}

fn cmd_query(db_path: &std::path::Path, text: &str, role_name: &str, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let role = resolve_role(&storage, role_name)?;
    let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
    let reranker = LexicalOverlapReranker;
    let llm = StubLlmClient;

    let output = crate::query::run(&storage, &embedder, &reranker, &llm, text, &role)?;
    Ok(format_query_output(&output, format))
}

fn cmd_classify(
    path: Option<&Path>,
    text: Option<&str>,
    filename: &str,
    format: OutputFormat,
) -> Result<String> {
    let (content, name) = if let Some(path) = path {
        let extractors = ExtractorRegistry::default();
        let extracted = extractors.extract(path)?;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or(filename).to_string();
        (extracted.text, name)
    } else if let Some(text) = text {
        (text.to_string(), filename.to_string())
    } else {
        return Err(CommandError::MissingArgument("path or --text".to_string()).into());
    };

    let classification = crate::classify::classify_hierarchical(&content, &name);
    Ok(format_classification(&classification, format))
}

fn cmd_upload(
    db_path: &std::path::Path,
    username: &str,
    file: &Path,
    drop_dir: &Path,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let user = storage
        .get_user_by_username(username)?
        .ok_or_else(|| DocError::NotFound(format!("user {username}")))?;
    let role = resolve_role(&storage, &user.role)?;

    std::fs::create_dir_all(drop_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("could not create drop directory: {e}"))
    })?;

    let size_bytes = std::fs::metadata(file)
        .map_err(|e| CommandError::ExecutionFailed(format!("could not stat {}: {e}", file.display())))?
        .len();
    let filename = file.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        CommandError::InvalidArgument("upload path has no filename".to_string())
    })?;

    let limits = UploadLimits::default();
    let upload_id = {
        let mut tracker = UploadTracker::new(&mut storage, limits);
        tracker.accept(user.id, &role, filename, size_bytes, drop_dir)?
    };
    std::fs::copy(file, drop_dir.join(filename)).map_err(|e| {
        CommandError::ExecutionFailed(format!("could not copy file into drop directory: {e}"))
    })?;

    let body = serde_json::json!({ "upload_id": upload_id, "filename": filename });
    Ok(match format {
        OutputFormat::Text => format!("Accepted upload #{upload_id}: {filename}\n"),
        OutputFormat::Json | OutputFormat::Ndjson => {
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| "{}".to_string())
        }
    })
}

fn cmd_files_list(db_path: &std::path::Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let documents = storage.list_documents()?;
    Ok(format_document_list(&documents, format))
}

fn cmd_files_delete(
    db_path: &std::path::Path,
    identifier: &str,
    role_name: &str,
    requester: Option<i64>,
    sorted_root: &Path,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let role = resolve_role(&storage, role_name)?;
    let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
    let chunker = crate::chunking::AdaptiveChunker::new();

    // A pending (not yet ingested) upload is addressed by its numeric ID;
    // an indexed document is addressed by its content hash.
    let message = if let Ok(upload_id) = identifier.parse::<i64>() {
        let limits = UploadLimits::default();
        let mut tracker = UploadTracker::new(&mut storage, limits);
        tracker.delete_pending(&role, requester, upload_id)?;
        format!("Deleted pending upload #{upload_id}\n")
    } else {
        let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
        match index.delete_file(&role, requester, identifier, sorted_root)? {
            DeleteOutcome::Done => format!("Deleted {identifier}\n"),
            DeleteOutcome::NotFound => return Err(DocError::NotFound(identifier.to_string()).into()),
        }
    };

    Ok(match format {
        OutputFormat::Text => message,
        OutputFormat::Json | OutputFormat::Ndjson => {
            serde_json::to_string_pretty(&serde_json::json!({ "deleted": identifier })).unwrap_or_default()
        }
    })
}

fn cmd_roles_seed(db_path: &std::path::Path, format: OutputFormat) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    storage.seed_builtin_roles()?;
    let roles = storage.list_roles()?;
    Ok(format_role_list(&roles, format))
}

fn cmd_roles_list(db_path: &std::path::Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let roles = storage.list_roles()?;
    Ok(format_role_list(&roles, format))
}

fn cmd_roles_show(db_path: &std::path::Path, name: &str, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let role = resolve_role(&storage, name)?;
    Ok(format_role(&role, format))
}

fn cmd_roles_delete(db_path: &std::path::Path, name: &str, format: OutputFormat) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    let role = storage.get_role(name)?.ok_or_else(|| DocError::NotFound(format!("role {name}")))?;
    if role.is_builtin {
        return Err(DocError::Conflict(format!("{name} is a built-in role and cannot be deleted")).into());
    }
    storage.delete_role(name)?;
    Ok(match format {
        OutputFormat::Text => format!("Deleted role {name}\n"),
        OutputFormat::Json | OutputFormat::Ndjson => {
            serde_json::to_string_pretty(&serde_json::json!({ "deleted": name })).unwrap_or_default()
        }
    })
}

fn cmd_users_add(
    db_path: &std::path::Path,
    username: &str,
    role: &str,
    quota_bytes: u64,
    format: OutputFormat,
) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    resolve_role(&storage, role)?;
    let id = storage.create_user(username, role, quota_bytes)?;
    let user = storage.get_user(id)?.ok_or_else(|| DocError::NotFound(format!("user {id}")))?;
    Ok(match format {
        OutputFormat::Text => format!("Created user #{id}: {username} ({role})\n"),
        OutputFormat::Json | OutputFormat::Ndjson => format_user_list(std::slice::from_ref(&user), format),
    })
}

fn cmd_users_list(db_path: &std::path::Path, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let users: Vec<User> = storage.list_users()?;
    Ok(format_user_list(&users, format))
}

fn cmd_users_delete(db_path: &std::path::Path, id: i64, format: OutputFormat) -> Result<String> {
    let mut storage = open_storage(db_path)?;
    storage.get_user(id)?.ok_or_else(|| DocError::NotFound(format!("user {id}")))?;
    storage.delete_user(id)?;
    Ok(match format {
        OutputFormat::Text => format!("Deleted user #{id}\n"),
        OutputFormat::Json | OutputFormat::Ndjson => {
            serde_json::to_string_pretty(&serde_json::json!({ "deleted": id })).unwrap_or_default()
        }
    })
}
