//! Terminal staging failures.
//!
//! Every variant aborts the whole pipeline; nothing is retried beyond the
//! single fallback chain inside [`crate::fetch`]. Non-failures (an already
//! present database driver, an idempotent descriptor edit) are simply not
//! errors and never reach this type.

use crate::fetch::FetchError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    /// No framework predicate matched the build directory.
    #[error("no supported application framework detected in {0}")]
    DetectionFailed(PathBuf),

    /// The container archive unpacked but its startup binary is missing.
    #[error("unable to install {container}: {binary} missing after extraction")]
    ContainerInstall { container: String, binary: String },

    /// The JDK unpacked but `bin/java` is missing.
    #[error("unable to retrieve the JDK")]
    JdkInstall,

    /// `system.properties` asked for a Java version we have no archive for.
    #[error("unsupported Java version: {0}")]
    UnsupportedJavaVersion(String),

    /// Container-specific repackaging did not produce the expected archive.
    #[error("failed to repack the web application into {0}")]
    Repack(PathBuf),

    /// No single dist directory with a start script and a lib directory.
    #[error("Play app not detected; run 'play dist' and push the resulting directory")]
    PlayDistLayout,

    /// Every fetch tier failed for a required artifact.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
