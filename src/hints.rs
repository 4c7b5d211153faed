//! Persisted detection decisions.
//!
//! Staging mutates the very file tree the detectors inspect (the app is moved
//! into the container web root, the container tree is hoisted to the build
//! root), so a detection answer is recorded the first time it is computed and
//! replayed for the rest of the build. One marker file per category at the
//! build-directory root, containing exactly the detected kind's name.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintCategory {
    Framework,
    Container,
}

impl HintCategory {
    pub fn file_name(&self) -> &'static str {
        match self {
            HintCategory::Framework => ".detected_framework",
            HintCategory::Container => ".detected_container",
        }
    }
}

/// Marker-file store scoped to one build directory.
#[derive(Debug, Clone)]
pub struct HintStore {
    build_dir: PathBuf,
}

impl HintStore {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    fn path(&self, category: HintCategory) -> PathBuf {
        self.build_dir.join(category.file_name())
    }

    /// The previously recorded name for `category`, if any. An unreadable
    /// marker is treated as absent so detection falls back to a fresh scan.
    pub fn read(&self, category: HintCategory) -> Option<String> {
        let content = fs::read_to_string(self.path(category)).ok()?;
        let name = content.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Records `name` for `category`. Later reads in this build (and in later
    /// phases re-running in the same directory) return exactly this value.
    pub fn write(&self, category: HintCategory, name: &str) -> Result<()> {
        let path = self.path(category);
        fs::write(&path, name)
            .with_context(|| format!("failed to write hint file {}", path.display()))
    }

    /// Drops a recorded decision, forcing the next detection to re-scan.
    pub fn clear(&self, category: HintCategory) {
        let _ = fs::remove_file(self.path(category));
    }
}
