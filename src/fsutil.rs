//! File-tree helpers shared by the detection predicates and the container
//! staging steps.

use anyhow::{Context, Result};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Returns true if `dir` directly contains an entry whose name matches the
/// glob `pattern`. Missing directories and invalid patterns match nothing.
pub fn dir_has_match(dir: &Path, pattern: &str) -> bool {
    !find_matches(dir, pattern).is_empty()
}

/// Entries of `dir` (non-recursive) whose file name matches the glob `pattern`.
pub fn find_matches(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let Ok(pattern) = Pattern::new(pattern) else {
        return Vec::new();
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| pattern.matches(name))
                .unwrap_or(false)
        })
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// Directories of `dir` (non-recursive) whose name matches the glob `pattern`.
pub fn find_matches_dirs(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    find_matches(dir, pattern)
        .into_iter()
        .filter(|p| p.is_dir())
        .collect()
}

/// Files anywhere under `root` whose file name matches the glob `pattern`.
pub fn find_matches_recursive(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let Ok(pattern) = Pattern::new(pattern) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| pattern.matches(name))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    found.sort();
    found
}

/// True if any file under `root` carries the given extension.
pub fn has_file_with_extension(root: &Path, extension: &str) -> bool {
    WalkDir::new(root)
        .into_iter()
        .flatten()
        .filter(|e| e.file_type().is_file())
        .any(|e| {
            e.path()
                .extension()
                .map(|ext| ext == extension)
                .unwrap_or(false)
        })
}

/// Moves a single file or directory, falling back to copy-and-remove when a
/// plain rename crosses a filesystem boundary.
pub fn move_entry(src: &Path, dst: &Path) -> Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    if src.is_dir() {
        copy_dir_recursive(src, dst)?;
        fs::remove_dir_all(src)
            .with_context(|| format!("failed to remove {}", src.display()))?;
    } else {
        fs::copy(src, dst).with_context(|| {
            format!("failed to copy {} to {}", src.display(), dst.display())
        })?;
        fs::remove_file(src)
            .with_context(|| format!("failed to remove {}", src.display()))?;
    }
    Ok(())
}

/// Moves every entry of `src` into `dst`, creating `dst` first.
pub fn move_dir_contents(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create {}", dst.display()))?;
    for name in entry_names(src)? {
        move_entry(&src.join(&name), &dst.join(&name))?;
    }
    Ok(())
}

/// Moves the visible (non dot-prefixed) entries of `dir` into `dst`. Staging
/// directories and hint files are dot-prefixed so they stay behind, the same
/// way a shell `mv *` leaves them.
pub fn move_visible_entries(dir: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create {}", dst.display()))?;
    for name in entry_names(dir)? {
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        move_entry(&dir.join(&name), &dst.join(&name))?;
    }
    Ok(())
}

/// Entry names collected up front, so callers can rearrange the directory
/// they are iterating.
fn entry_names(dir: &Path) -> Result<Vec<std::ffi::OsString>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        names.push(entry?.file_name());
    }
    Ok(names)
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create {}", dst.display()))?;
    for entry in
        fs::read_dir(src).with_context(|| format!("failed to read {}", src.display()))?
    {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("failed to copy {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}

/// Removes the entries named by `patterns` relative to `root`. A trailing
/// `/*` clears a directory's contents but keeps the directory itself; any
/// other pattern removes the file or directory outright. Missing entries are
/// not an error.
pub fn remove_discarded(root: &Path, patterns: &[&str]) -> Result<()> {
    for pattern in patterns {
        if let Some(dir) = pattern.strip_suffix("/*") {
            let dir = root.join(dir);
            if dir.is_dir() {
                for name in entry_names(&dir)? {
                    remove_path(&dir.join(name))?;
                }
            }
        } else {
            remove_path(&root.join(pattern))?;
        }
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
    } else if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}
