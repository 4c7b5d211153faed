//! Tarball extraction for runtime and container archives.

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::path::Path;
use tar::Archive;
use tracing::debug;

use crate::fsutil;

/// Unpacks a `.tar.gz` archive into `dest`.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    debug!("extracting {} to {}", archive.display(), dest.display());
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let mut tar = Archive::new(MultiGzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(dest)
        .with_context(|| format!("failed to unpack {}", archive.display()))
}

/// Hoists the contents of the archive's top-level wrapper directory
/// (matching `pattern`, e.g. `apache-tomcat-*`) into `dir` and removes the
/// wrapper. Archives without a matching wrapper are left as-is.
pub fn strip_wrapper_dir(dir: &Path, pattern: &str) -> Result<()> {
    for wrapper in fsutil::find_matches_dirs(dir, pattern) {
        fsutil::move_dir_contents(&wrapper, dir)?;
        std::fs::remove_dir_all(&wrapper)
            .with_context(|| format!("failed to remove {}", wrapper.display()))?;
    }
    Ok(())
}
