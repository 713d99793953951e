//! Persisting rendered output to named storage disks

use crate::{Error, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Named storage backends ("disks") that can persist bytes.
///
/// `put` reports success as a boolean; implementations log the reason for a
/// failure instead of returning it.
pub trait Storage: Send + Sync {
    fn put(&self, disk: &str, path: &str, bytes: &[u8]) -> bool;
}

/// Disks backed by directories on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDisks {
    roots: HashMap<String, PathBuf>,
}

impl Default for LocalDisks {
    /// A single `local` disk rooted at `./storage`
    fn default() -> Self {
        Self::new().with_disk("local", "storage")
    }
}

impl LocalDisks {
    /// No disks at all
    pub fn new() -> Self {
        Self {
            roots: HashMap::new(),
        }
    }

    pub fn with_disk(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(name.into(), root.into());
        self
    }

    /// Absolute location of `path` on `disk`
    pub fn resolve(&self, disk: &str, path: &str) -> Result<PathBuf> {
        let root = self
            .roots
            .get(disk)
            .ok_or_else(|| Error::Storage(format!("unknown disk '{}'", disk)))?;

        let relative = Path::new(path);
        let escapes = relative.components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if path.is_empty() || escapes {
            return Err(Error::Storage(format!(
                "path '{}' is not inside disk '{}'",
                path, disk
            )));
        }

        Ok(root.join(relative))
    }

    fn write(&self, disk: &str, path: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.resolve(disk, path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytes)?;
        Ok(target)
    }
}

impl Storage for LocalDisks {
    fn put(&self, disk: &str, path: &str, bytes: &[u8]) -> bool {
        match self.write(disk, path, bytes) {
            Ok(target) => {
                debug!("stored {} bytes at {}", bytes.len(), target.display());
                true
            }
            Err(e) => {
                warn!("failed to store '{}' on disk '{}': {}", path, disk, e);
                false
            }
        }
    }
}
