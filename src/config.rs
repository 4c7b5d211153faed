//! Staging configuration.
//!
//! Everything is read from environment variables with defaults that match
//! the platform's staging containers, so a bare `javastage stage <dir>`
//! works both inside the platform and on a developer machine.
//!
//! - `JAVASTAGE_CACHE_DIR`: pre-seeded artifact cache directory
//!   (default: `/var/vcap/packages/buildpack_cache`)
//! - `JAVASTAGE_BLOBSTORE_CONFIG`: path to the blob store YAML document
//!   (default: unset, blob store tier disabled)
//! - `JAVASTAGE_VENDOR_URL`: base URL for vendored runtime archives

use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_CACHE_DIR: &str = "/var/vcap/packages/buildpack_cache";
const DEFAULT_VENDOR_URL: &str = "https://s3.amazonaws.com/heroku-jvm-langpack-java";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("blob store config {0} does not exist")]
    MissingBlobstoreConfig(PathBuf),
}

#[derive(Debug, Clone)]
pub struct StagingConfig {
    /// Directory searched by the first fetch tier.
    pub cache_dir: PathBuf,
    /// Optional blob store configuration document for the second tier.
    pub blobstore_config: Option<PathBuf>,
    /// Base URL for vendored archives (JDK tarballs).
    pub vendor_url: String,
}

impl StagingConfig {
    /// Loads configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            cache_dir: env::var("JAVASTAGE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR)),
            blobstore_config: env::var("JAVASTAGE_BLOBSTORE_CONFIG")
                .ok()
                .map(PathBuf::from),
            vendor_url: env::var("JAVASTAGE_VENDOR_URL")
                .unwrap_or_else(|_| DEFAULT_VENDOR_URL.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.blobstore_config {
            if !path.is_file() {
                return Err(ConfigError::MissingBlobstoreConfig(path.clone()));
            }
        }
        Ok(())
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
