//! Private scratch directories for unpacking a container copy

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub const SCRATCH_PREFIX: &str = "countsheet-scratch-";

/// Uniquely named directory that is removed when dropped, on success or failure
#[derive(Debug)]
pub struct ScratchArea {
    dir: TempDir,
}

impl ScratchArea {
    pub fn create_in(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(root)?;
        log::debug!("created scratch area {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the container parts are unpacked
    pub fn parts_dir(&self) -> PathBuf {
        self.dir.path().join("parts")
    }

    /// Where the rebuilt container is assembled before it replaces the output
    pub fn rebuilt_path(&self) -> PathBuf {
        self.dir.path().join("rebuilt.xlsx")
    }
}

/// Remove scratch directories under `root` left behind by interrupted runs.
///
/// Only directories named with the scratch prefix and last modified more than
/// `max_age` ago are removed. Returns the number removed.
pub fn sweep_stale_scratch(root: &Path, max_age: Duration) -> Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(SCRATCH_PREFIX) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_dir() {
            continue;
        }
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        match fs::remove_dir_all(entry.path()) {
            Ok(()) => {
                log::info!("removed stale scratch area {}", entry.path().display());
                removed += 1;
            }
            Err(e) => log::warn!(
                "could not remove stale scratch area {}: {}",
                entry.path().display(),
                e
            ),
        }
    }

    Ok(removed)
}
