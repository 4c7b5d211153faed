//! JDK provisioning for the staged application.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::archive;
use crate::error::StageError;
use crate::fetch::ArtifactFetcher;
use crate::sysprops;

/// Where the JDK lands, relative to the build root. Dot-prefixed so the
/// webapp move leaves it alone.
pub const JDK_DIR: &str = ".jdk";

const DEFAULT_JDK_VERSION: &str = "1.6";

/// Vendored archive names by requested runtime version.
fn archive_for(version: &str) -> Option<&'static str> {
    match version {
        "1.6" => Some("openjdk6-u25-heroku-temaki.tar.gz"),
        "1.7" => Some("openjdk7-u7-heroku-temaki-b30.tar.gz"),
        "1.8" => Some("openjdk8-lambda-preview.tar.gz"),
        _ => None,
    }
}

/// The Java version the application asks for via `system.properties`,
/// falling back to the platform default.
pub fn requested_version(build_dir: &Path) -> String {
    sysprops::system_properties(build_dir)
        .get(sysprops::JAVA_RUNTIME_VERSION)
        .cloned()
        .unwrap_or_else(|| DEFAULT_JDK_VERSION.to_string())
}

/// Fetches and unpacks the JDK into `.jdk/`, verifying `bin/java` exists.
/// The downloaded tarball is removed whether or not the install succeeds.
pub fn install(build_dir: &Path, fetcher: &ArtifactFetcher, vendor_url: &str) -> Result<()> {
    let version = requested_version(build_dir);
    let archive_name = archive_for(&version)
        .ok_or_else(|| StageError::UnsupportedJavaVersion(version.clone()))?;

    let jdk_dir = build_dir.join(JDK_DIR);
    fs::create_dir_all(&jdk_dir)
        .with_context(|| format!("failed to create {}", jdk_dir.display()))?;

    info!("installing JDK {version}");
    let tarball = fetcher.fetch(archive_name, vendor_url, &jdk_dir)?;
    let result = archive::extract_tar_gz(&tarball, &jdk_dir);
    let _ = fs::remove_file(&tarball);
    result?;

    if !jdk_dir.join("bin/java").is_file() {
        return Err(StageError::JdkInstall.into());
    }
    Ok(())
}
