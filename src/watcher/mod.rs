//! Drop-directory watcher.
//!
//! Bridges `notify`'s native OS watcher (which calls back on its own
//! thread) into the async world via an unbounded channel, settles
//! file-created events for a short interval before enqueueing ingestion,
//! and runs a periodic prune sweep over chunks whose backing file is gone.

use crate::documents::DocumentIndex;
use crate::embedding::Embedder;
use crate::error::{DocError, Result};
use crate::storage::SqliteStorage;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Extensions skipped on principle: compiled artifacts, not source documents.
const SKIPPED_EXTENSIONS: &[&str] = &["pyc", "pyo", "pyd", "so", "dll", "exe", "sh", "bat"];

/// Filenames skipped regardless of extension.
const SKIPPED_NAMES: &[&str] = &[".gitignore", ".DS_Store", "Thumbs.db", "desktop.ini"];

/// Returns whether `path` should be ignored by the watcher.
#[must_use]
pub fn is_skipped(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    if name.starts_with('.') || SKIPPED_NAMES.contains(&name) {
        return true;
    }
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase();
    SKIPPED_EXTENSIONS.contains(&extension.as_str())
}

/// An event the watcher hands to its consumer after filtering and settling.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A file was created (and has settled) and should be ingested.
    Created(PathBuf),
    /// A file was deleted and its chunks should be removed.
    Deleted(PathBuf),
}

/// Watches `drop_dir` recursively, emitting filtered, settled [`WatchEvent`]s.
pub struct DropDirWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<WatchEvent>,
}

impl DropDirWatcher {
    /// Starts watching `drop_dir`, waiting `settle` after each file-created
    /// event before emitting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the native watcher cannot be installed.
    pub fn start(drop_dir: &Path, settle: Duration) -> Result<Self> {
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<Event>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = raw_tx.send(event);
            }
        })
        .map_err(|e| DocError::ModelUnavailable(format!("failed to start watcher: {e}")))?;

        watcher
            .watch(drop_dir, RecursiveMode::Recursive)
            .map_err(|e| DocError::ModelUnavailable(format!("failed to watch {}: {e}", drop_dir.display())))?;

        let (tx, rx) = mpsc::unbounded_channel::<WatchEvent>();
        tokio::spawn(async move {
            while let Some(event) = raw_rx.recv().await {
                for path in event.paths {
                    if is_skipped(&path) || path.is_dir() {
                        continue;
                    }
                    match event.kind {
                        EventKind::Create(_) => {
                            let tx = tx.clone();
                            let path = path.clone();
                            tokio::spawn(async move {
                                tokio::time::sleep(settle).await;
                                if path.exists() {
                                    let _ = tx.send(WatchEvent::Created(path));
                                }
                            });
                        }
                        EventKind::Remove(_) => {
                            let _ = tx.send(WatchEvent::Deleted(path));
                        }
                        _ => {}
                    }
                }
            }
        });

        Ok(Self { _watcher: watcher, receiver: rx })
    }

    /// Receives the next filtered, settled event.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.receiver.recv().await
    }
}

/// Removes a document's chunks after its backing file was deleted, matching
/// by `file_hash` when tracked, otherwise by `filepath`.
///
/// # Errors
///
/// Returns an error if storage access fails.
pub fn handle_deleted(storage: &mut SqliteStorage, embedder: &dyn Embedder, path: &Path, sorted_root: &Path) -> Result<()> {
    let Ok(relative) = path.strip_prefix(sorted_root) else {
        return Ok(());
    };
    let relative = relative.to_string_lossy().replace('\\', "/");
    let chunker = crate::chunking::AdaptiveChunker::new();
    let mut index = DocumentIndex::new(storage, embedder, &chunker);
    if let Some(doc) = index.get_by_filepath(&relative)? {
        index.delete(&doc.file_hash)?;
    }
    Ok(())
}

/// Sweeps all indexed documents and deletes any whose `filepath` no longer
/// exists under `sorted_root`, without re-ingesting anything.
///
/// Returns the number of documents pruned.
///
/// # Errors
///
/// Returns an error if storage access fails.
pub fn prune_sweep(storage: &mut SqliteStorage, embedder: &dyn Embedder, sorted_root: &Path) -> Result<usize> {
    let chunker = crate::chunking::AdaptiveChunker::new();
    let stale: Vec<String> = {
        let index = DocumentIndex::new(storage, embedder, &chunker);
        index
            .list()?
            .into_iter()
            .filter(|doc| !sorted_root.join(&doc.filepath).exists())
            .map(|doc| doc.file_hash)
            .collect()
    };
    let mut index = DocumentIndex::new(storage, embedder, &chunker);
    for file_hash in &stale {
        index.delete(file_hash)?;
    }
    Ok(stale.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_dotfiles_and_blacklisted_names() {
        assert!(is_skipped(Path::new("/drop/.hidden")));
        assert!(is_skipped(Path::new("/drop/.gitignore")));
        assert!(is_skipped(Path::new("/drop/Thumbs.db")));
        assert!(!is_skipped(Path::new("/drop/report.txt")));
    }

    #[test]
    fn skips_compiled_artifact_extensions() {
        assert!(is_skipped(Path::new("/drop/module.pyc")));
        assert!(is_skipped(Path::new("/drop/lib.so")));
        assert!(!is_skipped(Path::new("/drop/notes.md")));
    }

    #[test]
    fn prune_sweep_removes_documents_with_missing_files() {
        use crate::documents::NewDocument;
        use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
        use crate::storage::Storage;

        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let sorted_root = tempfile::tempdir().unwrap();

        {
            let chunker = crate::chunking::AdaptiveChunker::new();
            let mut index = DocumentIndex::new(&mut storage, &embedder, &chunker);
            index
                .add(NewDocument {
                    file_hash: "h1".to_string(),
                    filepath: "Technology/Other/txt/ghost.txt".to_string(),
                    filename: "ghost.txt".to_string(),
                    domain: "Technology".to_string(),
                    category: "Other".to_string(),
                    confidence: 0.5,
                    owner_id: None,
                    text: "content that no longer has a backing file",
                })
                .unwrap();
        }

        let pruned = prune_sweep(&mut storage, &embedder, sorted_root.path()).unwrap();
        assert_eq!(pruned, 1);
    }
}
