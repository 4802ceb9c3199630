//! Exclusively-owned temporary project directories
//!
//! A workspace is removed when dropped. If synchronous removal fails the path is remembered in a
//! process-wide list that [`purge_deferred`] retries; every `BuildOrchestrator` purges it when
//! dropped.

use crate::error::{JavapackError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

const WORKSPACE_PREFIX: &str = "javapack-";

static DEFERRED: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

#[derive(Debug)]
pub struct TemporaryWorkspace {
    path: PathBuf,
}

impl TemporaryWorkspace {
    /// Creates a fresh directory under the system temp dir
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    pub fn create_in(parent: &Path) -> Result<Self> {
        let path = parent.join(format!("{}{}", WORKSPACE_PREFIX, Uuid::new_v4()));
        fs::create_dir_all(&path).map_err(|e| JavapackError::workspace(&path, e))?;
        debug!(path = %path.display(), "Created temporary workspace");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path.join(relative)
    }
}

impl Drop for TemporaryWorkspace {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed temporary workspace"),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not remove workspace, deferring until exit"
                );
                defer_removal(self.path.clone());
            }
        }
    }
}

/// Schedules `path` for best-effort removal by [`purge_deferred`]
pub fn defer_removal(path: PathBuf) {
    let mut pending = DEFERRED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    push_unique(&mut pending, path);
}

fn push_unique(pending: &mut Vec<PathBuf>, path: PathBuf) {
    if !pending.contains(&path) {
        pending.push(path);
    }
}

/// Paths still waiting for removal
pub fn deferred_paths() -> Vec<PathBuf> {
    DEFERRED
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Removes every deferred path that can be removed now; returns the ones that remain.
pub fn purge_deferred() -> Vec<PathBuf> {
    let mut pending = DEFERRED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    pending.retain(|path| {
        if !path.exists() {
            return false;
        }
        let removed = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        match removed {
            Ok(()) => false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Deferred removal failed");
                true
            }
        }
    });
    pending.clone()
}
