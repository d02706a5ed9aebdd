//! Snapshot persistence: owned movies per library and computed gaps.

use crate::models::snapshot::{LibrarySnapshot, MissingSnapshot};
use crate::models::Movie;
use crate::utils::fs::{sanitize_component, write_atomic};
use crate::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the lock file a run holds inside the data directory.
pub const RUN_LOCK_FILE: &str = "run.lock";

/// Exclusive claim on the snapshot files for the length of one run.
///
/// Dropping the guard releases the claim and removes the lock file.
#[derive(Debug)]
pub struct RunLock {
    path: Option<PathBuf>,
}

impl RunLock {
    /// A guard over nothing, for stores no other process can reach.
    pub fn unshared() -> Self {
        Self { path: None }
    }

    /// Create `path` exclusively, failing with [`Error::RunInProgress`] when it
    /// already exists.
    pub fn acquire(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::warn!(
                    "Lock file {} exists; delete it if no other run is active",
                    path.display()
                );
                return Err(Error::RunInProgress);
            }
            Err(e) => return Err(e.into()),
        };

        let lock = Self { path: Some(path) };
        writeln!(
            file,
            "pid={}\nstarted_at={}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        )?;
        Ok(lock)
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!("Failed to remove lock file {}: {}", path.display(), e);
            }
        }
    }
}

/// Where owned-movie and missing-movie snapshots live.
pub trait SnapshotStore: Send + Sync {
    /// Every persisted library snapshot, across all servers.
    ///
    /// Unreadable or unparseable snapshots are skipped with a warning.
    fn read_global_owned_movies(&self) -> Result<Vec<LibrarySnapshot>>;

    /// The snapshot of one library, if it was ever synced.
    fn read_library_movies(&self, server_id: &str, library_key: &str) -> Result<Option<LibrarySnapshot>>;

    /// Replace the owned movies of one library.
    fn write_library_movies(&self, server_id: &str, library_key: &str, movies: &[Movie]) -> Result<()>;

    /// Replace the computed gaps of one library.
    fn write_library_missing(&self, snapshot: &MissingSnapshot) -> Result<()>;

    /// The last computed gaps of one library.
    fn read_library_missing(&self, server_id: &str, library_key: &str) -> Result<Option<MissingSnapshot>>;

    /// Every computed gap snapshot.
    fn read_all_missing(&self) -> Result<Vec<MissingSnapshot>>;

    /// Claim the store for one run. Stores private to one process need no
    /// claim beyond the pipeline's own lock.
    fn lock_run(&self) -> Result<RunLock> {
        Ok(RunLock::unshared())
    }
}

/// JSON files under a data directory:
/// `owned/<server>/<library>.json` and `missing/<server>/<library>.json`.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    root: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn owned_dir(&self) -> PathBuf {
        self.root.join("owned")
    }

    fn missing_dir(&self) -> PathBuf {
        self.root.join("missing")
    }

    fn file_in(dir: PathBuf, server_id: &str, library_key: &str) -> PathBuf {
        dir.join(sanitize_component(server_id))
            .join(format!("{}.json", sanitize_component(library_key)))
    }

    /// Path of a library's owned-movie snapshot.
    pub fn owned_path(&self, server_id: &str, library_key: &str) -> PathBuf {
        Self::file_in(self.owned_dir(), server_id, library_key)
    }

    /// Path of a library's missing-movie snapshot.
    pub fn missing_path(&self, server_id: &str, library_key: &str) -> PathBuf {
        Self::file_in(self.missing_dir(), server_id, library_key)
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        write_atomic(path, content.as_bytes()).map_err(|e| Error::SnapshotWrite(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Snapshot saved to: {}", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::SnapshotRead(format!("{}: {}", path.display(), e))),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::SnapshotRead(format!("{}: {}", path.display(), e)))
    }

    /// Read every `*.json` below `dir`, skipping files that fail to parse.
    fn read_all<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|e| Error::SnapshotRead(e.to_string()))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();

        let mut snapshots = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::read_json(&path) {
                Ok(Some(snapshot)) => snapshots.push(snapshot),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unreadable snapshot: {}", e),
            }
        }
        Ok(snapshots)
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn read_global_owned_movies(&self) -> Result<Vec<LibrarySnapshot>> {
        Self::read_all(&self.owned_dir())
    }

    fn read_library_movies(&self, server_id: &str, library_key: &str) -> Result<Option<LibrarySnapshot>> {
        let path = self.owned_path(server_id, library_key);
        let snapshot: Option<LibrarySnapshot> = Self::read_json(&path)?;
        match snapshot {
            Some(s) if !s.is_for(server_id, library_key) => Err(foreign_snapshot(&path, &s.server_id, &s.library_key)),
            other => Ok(other),
        }
    }

    fn write_library_movies(&self, server_id: &str, library_key: &str, movies: &[Movie]) -> Result<()> {
        let snapshot = LibrarySnapshot::new(server_id, library_key, movies.to_vec());
        Self::write_json(&self.owned_path(server_id, library_key), &snapshot)
    }

    fn write_library_missing(&self, snapshot: &MissingSnapshot) -> Result<()> {
        Self::write_json(&self.missing_path(&snapshot.server_id, &snapshot.library_key), snapshot)
    }

    fn read_library_missing(&self, server_id: &str, library_key: &str) -> Result<Option<MissingSnapshot>> {
        let path = self.missing_path(server_id, library_key);
        let snapshot: Option<MissingSnapshot> = Self::read_json(&path)?;
        match snapshot {
            Some(s) if !s.is_for(server_id, library_key) => Err(foreign_snapshot(&path, &s.server_id, &s.library_key)),
            other => Ok(other),
        }
    }

    fn read_all_missing(&self) -> Result<Vec<MissingSnapshot>> {
        Self::read_all(&self.missing_dir())
    }

    fn lock_run(&self) -> Result<RunLock> {
        RunLock::acquire(self.root.join(RUN_LOCK_FILE))
    }
}

/// Two ids can sanitize to the same file name; the file then belongs to the
/// other library.
fn foreign_snapshot(path: &Path, server_id: &str, library_key: &str) -> Error {
    Error::SnapshotRead(format!(
        "{}: holds library {} of server {}",
        path.display(),
        library_key,
        server_id
    ))
}
