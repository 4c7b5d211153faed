//! Layered artifact fetching: local cache, then the authenticated blob
//! store, then a direct download.
//!
//! The chain is a single linear fallback, not a retry loop: each tier gets
//! one attempt and a failed tier simply hands over to the next. Callers see
//! either a local file path or a [`FetchError`] once every tier is exhausted.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unable to fetch {filename}: local cache, blob store and {url} all failed")]
    AllTiersFailed { filename: String, url: String },
    #[error("failed to initialize HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// One blob-store entry: object id, request signature and expected checksum.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobEntry {
    pub oid: Option<String>,
    pub sig: Option<String>,
    pub sha: Option<String>,
}

/// The blob-store configuration document (YAML).
#[derive(Debug, Clone, Deserialize)]
pub struct BlobstoreConfig {
    pub url: String,
    pub uid: String,
    #[serde(default)]
    pub exp: Option<String>,
    #[serde(default)]
    pub blobs: HashMap<String, BlobEntry>,
}

impl BlobstoreConfig {
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!("ignoring malformed blob store config {}: {err}", path.display());
                None
            }
        }
    }
}

/// Fetches named artifacts through the cache / blob store / direct-download
/// chain. Holds no per-build state and may be shared across pipeline phases.
pub struct ArtifactFetcher {
    cache_dir: PathBuf,
    blobstore: Option<BlobstoreConfig>,
    client: reqwest::blocking::Client,
}

impl ArtifactFetcher {
    pub fn new(
        cache_dir: PathBuf,
        blobstore: Option<BlobstoreConfig>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            cache_dir,
            blobstore,
            client,
        })
    }

    /// Fetches `filename` into `dest_dir`, trying the pre-seeded cache, the
    /// blob store, then `<source_url>/<filename>`. Returns the path of the
    /// fetched file.
    pub fn fetch(
        &self,
        filename: &str,
        source_url: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        if let Some(path) = self.fetch_from_cache(filename, dest_dir) {
            return Ok(path);
        }
        if let Some(path) = self.fetch_from_blobstore(filename, dest_dir) {
            return Ok(path);
        }
        if let Some(path) = self.fetch_from_url(filename, source_url, dest_dir) {
            return Ok(path);
        }
        Err(FetchError::AllTiersFailed {
            filename: filename.to_string(),
            url: source_url.to_string(),
        })
    }

    fn fetch_from_cache(&self, filename: &str, dest_dir: &Path) -> Option<PathBuf> {
        let cached = self.cache_dir.join(filename);
        if !cached.is_file() {
            return None;
        }
        info!("copying {filename} from the buildpack cache");
        let dest = dest_dir.join(filename);
        match fs::copy(&cached, &dest) {
            Ok(_) => Some(dest),
            Err(err) => {
                warn!("failed to copy {} from cache: {err}", cached.display());
                None
            }
        }
    }

    fn fetch_from_blobstore(&self, filename: &str, dest_dir: &Path) -> Option<PathBuf> {
        let config = self.blobstore.as_ref()?;
        let entry = config.blobs.get(filename)?;
        let (Some(oid), Some(sig), Some(sha)) = (&entry.oid, &entry.sig, &entry.sha) else {
            warn!("blob store entry for {filename} is missing an object id, signature or checksum");
            return None;
        };

        let mut url = match url::Url::parse(&format!("{}/rest/objects/{oid}", config.url)) {
            Ok(url) => url,
            Err(err) => {
                warn!("invalid blob store URL for {filename}: {err}");
                return None;
            }
        };
        url.query_pairs_mut()
            .append_pair("uid", &config.uid)
            .append_pair("expires", config.exp.as_deref().unwrap_or_default())
            .append_pair("signature", sig);

        info!("downloading {filename} from the blob store");
        let dest = dest_dir.join(filename);
        if self.download(url.as_str(), &dest).is_none() {
            return None;
        }

        match file_checksum(&dest) {
            Ok(actual) if actual == *sha => Some(dest),
            Ok(actual) => {
                warn!("checksum mismatch for downloaded blob {filename}: expected {sha}, got {actual}");
                let _ = fs::remove_file(&dest);
                None
            }
            Err(err) => {
                warn!("failed to checksum {}: {err}", dest.display());
                let _ = fs::remove_file(&dest);
                None
            }
        }
    }

    fn fetch_from_url(
        &self,
        filename: &str,
        source_url: &str,
        dest_dir: &Path,
    ) -> Option<PathBuf> {
        let url = format!("{}/{}", source_url.trim_end_matches('/'), filename);
        info!("downloading {filename} from {url}");
        let dest = dest_dir.join(filename);
        self.download(&url, &dest)
    }

    fn download(&self, url: &str, dest: &Path) -> Option<PathBuf> {
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(err) => {
                warn!("request to {url} failed: {err}");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("download from {url} failed with HTTP {}", response.status());
            return None;
        }
        let bytes = match response.bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("failed to read response body from {url}: {err}");
                return None;
            }
        };
        debug!("writing {} bytes to {}", bytes.len(), dest.display());
        if let Err(err) = fs::write(dest, &bytes) {
            warn!("failed to write {}: {err}", dest.display());
            let _ = fs::remove_file(dest);
            return None;
        }
        Some(dest.to_path_buf())
    }
}

fn file_checksum(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}
