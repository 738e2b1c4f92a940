//! Filesystem access for downloaded files
//!
//! Every operation returns a `DomainResult`; I/O failures surface as
//! `system-error / io-failure` with the path in the error context.

use crate::core::error::{DomainError, DomainResult, ErrorCode};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Filesystem operations the download core depends on.
pub trait FileStore: Send + Sync {
    /// Creates the directory and any missing parents.
    fn ensure_dir(&self, path: &Path) -> DomainResult<()>;

    /// Removes a file, or a directory with its contents. Missing paths are fine.
    fn delete_if_exists(&self, path: &Path) -> DomainResult<()>;

    /// Size of a file in bytes.
    fn size_of(&self, path: &Path) -> DomainResult<u64>;

    fn exists(&self, path: &Path) -> bool;

    /// Entries directly inside `dir`.
    fn list_dir(&self, dir: &Path) -> DomainResult<Vec<PathBuf>>;
}

fn io_failure(op: &str, path: &Path, err: std::io::Error) -> DomainError {
    DomainError::new(ErrorCode::IoFailure, format!("{} failed: {}", op, err))
        .with_context("path", path.display())
        .with_context("operation", op)
}

/// `FileStore` on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn ensure_dir(&self, path: &Path) -> DomainResult<()> {
        fs_err::create_dir_all(path).map_err(|e| io_failure("create_dir", path, e))
    }

    fn delete_if_exists(&self, path: &Path) -> DomainResult<()> {
        let result = match fs_err::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs_err::remove_dir_all(path),
            Ok(_) => fs_err::remove_file(path),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_failure("delete", path, e)),
        }
    }

    fn size_of(&self, path: &Path) -> DomainResult<u64> {
        fs_err::metadata(path)
            .map(|m| m.len())
            .map_err(|e| io_failure("metadata", path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dir(&self, dir: &Path) -> DomainResult<Vec<PathBuf>> {
        let entries = fs_err::read_dir(dir).map_err(|e| io_failure("read_dir", dir, e))?;
        Ok(entries.flatten().map(|entry| entry.path()).collect())
    }
}
