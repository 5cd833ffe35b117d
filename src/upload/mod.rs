//! Upload quota and size-cap enforcement.
//!
//! Tracks cumulative bytes and file count per user via
//! [`crate::storage::SqliteStorage`]'s upload-ledger methods, and rejects
//! uploads that would exceed a per-user file-count quota, a per-file size
//! cap, or collide with a filename already present in the drop directory,
//! unless the caller's role is wildcard (`Admin`).

use crate::error::{DocError, Result};
use crate::rbac::{AccessSet, Role};
use crate::storage::SqliteStorage;
use std::path::Path;

/// Quota and size-cap configuration for the upload tracker.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Maximum number of files a non-wildcard user may have uploaded.
    pub quota_files: u64,
    /// Maximum size, in bytes, of a single uploaded file.
    pub max_file_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            quota_files: crate::config::DEFAULT_UPLOAD_QUOTA_FILES,
            max_file_bytes: crate::config::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Enforces upload quota and size caps, then records accepted uploads.
pub struct UploadTracker<'a> {
    storage: &'a mut SqliteStorage,
    limits: UploadLimits,
}

impl<'a> UploadTracker<'a> {
    /// Creates a tracker over `storage` with `limits`.
    pub const fn new(storage: &'a mut SqliteStorage, limits: UploadLimits) -> Self {
        Self { storage, limits }
    }

    fn role_has_wildcard_quota(role: &Role) -> bool {
        matches!(role.allowed_domains, AccessSet::Any) && role.is_builtin && role.name == "Admin"
    }

    /// Validates an upload against quota, size, and name-collision checks,
    /// recording it and inserting a pending Upload record (null
    /// `sorted_path`) if accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::QuotaExceeded`] if the user's file count would
    /// exceed their quota, [`DocError::Conflict`] if `size_bytes` exceeds
    /// [`UploadLimits::max_file_bytes`] or `filename` already exists in
    /// `drop_dir`.
    pub fn accept(
        &mut self,
        user_id: i64,
        role: &Role,
        filename: &str,
        size_bytes: u64,
        drop_dir: &Path,
    ) -> Result<i64> {
        if size_bytes > self.limits.max_file_bytes {
            return Err(DocError::Conflict(format!(
                "file size {size_bytes} exceeds the {}-byte cap",
                self.limits.max_file_bytes
            ))
            .into());
        }
        if drop_dir.join(filename).exists() {
            return Err(DocError::Conflict(format!(
                "{filename} already exists in the drop directory"
            ))
            .into());
        }

        if !Self::role_has_wildcard_quota(role) {
            let (_, file_count) = self.storage.user_upload_usage(user_id)?;
            if file_count + 1 > self.limits.quota_files {
                return Err(DocError::QuotaExceeded {
                    user: user_id.to_string(),
                    used: file_count,
                    requested: 1,
                    limit: self.limits.quota_files,
                }
                .into());
            }
        }

        self.storage.record_user_upload(user_id, size_bytes)?;
        self.storage.create_upload_record(Some(user_id), filename, size_bytes)
    }

    /// Deletes a still-pending (not yet ingested) upload record.
    ///
    /// Domain-level RBAC does not apply: a pending upload has no
    /// classification yet. Authorization is `files.delete.all`/`*`, or
    /// `files.delete.own` with `requester_id` matching the record's owner.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::AuthError`] if the caller lacks the required
    /// capability, or [`DocError::NotFound`] if no pending upload has `id`.
    pub fn delete_pending(&mut self, role: &Role, requester_id: Option<i64>, upload_id: i64) -> Result<()> {
        let Some((_, owner_id)) = self.storage.find_pending_upload(upload_id)? else {
            return Err(DocError::NotFound(format!("pending upload {upload_id}")).into());
        };

        let has_all = crate::rbac::has_capability(role, "files.delete.all");
        let has_own =
            crate::rbac::has_capability(role, "files.delete.own") && requester_id.is_some() && requester_id == owner_id;
        if !has_all && !has_own {
            return Err(DocError::AuthError(format!(
                "role {} lacks files.delete.all/own for upload {upload_id}",
                role.name
            ))
            .into());
        }

        self.storage.delete_upload_record(upload_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::builtin_roles;
    use crate::storage::Storage;

    fn student_role() -> Role {
        builtin_roles().into_iter().find(|r| r.name == "Student").unwrap()
    }

    #[test]
    fn accepts_uploads_within_quota() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        storage.seed_builtin_roles().unwrap();
        let user_id = storage.create_user("alice", "Student", 0).unwrap();
        let role = student_role();
        let limits = UploadLimits { quota_files: 2, max_file_bytes: 1_000 };
        let drop_dir = tempfile::tempdir().unwrap();
        let mut tracker = UploadTracker::new(&mut storage, limits);

        tracker.accept(user_id, &role, "a.txt", 100, drop_dir.path()).unwrap();
        tracker.accept(user_id, &role, "b.txt", 100, drop_dir.path()).unwrap();
        assert!(tracker.accept(user_id, &role, "c.txt", 100, drop_dir.path()).is_err());
    }

    #[test]
    fn rejects_oversized_file() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        storage.seed_builtin_roles().unwrap();
        let user_id = storage.create_user("bob", "Student", 0).unwrap();
        let role = student_role();
        let limits = UploadLimits { quota_files: 10, max_file_bytes: 100 };
        let drop_dir = tempfile::tempdir().unwrap();
        let mut tracker = UploadTracker::new(&mut storage, limits);

        assert!(tracker.accept(user_id, &role, "big.txt", 200, drop_dir.path()).is_err());
    }

    #[test]
    fn rejects_name_collision_in_drop_dir() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        storage.seed_builtin_roles().unwrap();
        let user_id = storage.create_user("carol", "Student", 0).unwrap();
        let role = student_role();
        let limits = UploadLimits { quota_files: 10, max_file_bytes: 1_000 };
        let drop_dir = tempfile::tempdir().unwrap();
        std::fs::write(drop_dir.path().join("dup.txt"), "existing").unwrap();
        let mut tracker = UploadTracker::new(&mut storage, limits);

        assert!(tracker.accept(user_id, &role, "dup.txt", 100, drop_dir.path()).is_err());
    }

    #[test]
    fn admin_role_bypasses_quota() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        storage.seed_builtin_roles().unwrap();
        let user_id = storage.create_user("admin", "Admin", 0).unwrap();
        let role = builtin_roles().into_iter().find(|r| r.name == "Admin").unwrap();
        let limits = UploadLimits { quota_files: 1, max_file_bytes: 1_000 };
        let drop_dir = tempfile::tempdir().unwrap();
        let mut tracker = UploadTracker::new(&mut storage, limits);

        tracker.accept(user_id, &role, "a.txt", 100, drop_dir.path()).unwrap();
        tracker.accept(user_id, &role, "b.txt", 100, drop_dir.path()).unwrap();
    }

    #[test]
    fn delete_pending_allows_owner() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        storage.seed_builtin_roles().unwrap();
        let user_id = storage.create_user("dave", "Student", 0).unwrap();
        let role = student_role();
        let limits = UploadLimits::default();
        let drop_dir = tempfile::tempdir().unwrap();
        let mut tracker = UploadTracker::new(&mut storage, limits);
        let upload_id = tracker.accept(user_id, &role, "a.txt", 100, drop_dir.path()).unwrap();

        tracker.delete_pending(&role, Some(user_id), upload_id).unwrap();
        assert!(storage.find_pending_upload(upload_id).unwrap().is_none());
    }

    #[test]
    fn delete_pending_denies_non_owner_without_capability() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        storage.seed_builtin_roles().unwrap();
        let user_id = storage.create_user("erin", "Student", 0).unwrap();
        let role = student_role();
        let limits = UploadLimits::default();
        let drop_dir = tempfile::tempdir().unwrap();
        let mut tracker = UploadTracker::new(&mut storage, limits);
        let upload_id = tracker.accept(user_id, &role, "a.txt", 100, drop_dir.path()).unwrap();

        let other = student_role();
        assert!(tracker.delete_pending(&other, Some(user_id + 1), upload_id).is_err());
    }
}
