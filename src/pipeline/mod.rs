//! The staging pipeline.
//!
//! Strictly sequential, one run per build invocation: detect the framework,
//! provision the JDK, install and configure the container (web apps),
//! rewrite the deployment descriptor (Spring/Grails), repack (JBoss), then
//! emit the startup environment and release metadata. A failure at any step
//! aborts the remainder; partial builds are never valid.

pub mod autostage;
pub mod profile_script;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::StagingConfig;
use crate::container::{self, lifecycle, ContainerRegistry};
use crate::error::StageError;
use crate::fetch::{ArtifactFetcher, BlobstoreConfig};
use crate::framework::{self, FrameworkKind};
use crate::hints::HintStore;
use crate::jdk;
use crate::release::{self, Release};

pub struct BuildPipeline {
    build_dir: PathBuf,
    config: StagingConfig,
    containers: ContainerRegistry,
    hints: HintStore,
    fetcher: ArtifactFetcher,
}

impl BuildPipeline {
    pub fn new(build_dir: &Path, config: StagingConfig) -> Result<Self> {
        config.validate()?;
        let blobstore = config
            .blobstore_config
            .as_deref()
            .and_then(BlobstoreConfig::load);
        let fetcher = ArtifactFetcher::new(config.cache_dir.clone(), blobstore)?;
        Ok(Self {
            build_dir: build_dir.to_path_buf(),
            config,
            containers: ContainerRegistry::with_defaults(),
            hints: HintStore::new(build_dir),
            fetcher,
        })
    }

    /// The detection entry point: hint-aware, memoizing, side-effect free
    /// beyond the hint file itself.
    pub fn detect(&self) -> Option<FrameworkKind> {
        framework::detect(&self.build_dir, &self.containers, &self.hints)
    }

    /// Runs the whole staging pipeline and returns the release metadata.
    pub fn stage(&self) -> Result<Release> {
        let kind = self
            .detect()
            .ok_or_else(|| StageError::DetectionFailed(self.build_dir.clone()))?;
        info!("staging {kind} application in {}", self.build_dir.display());

        jdk::install(&self.build_dir, &self.fetcher, &self.config.vendor_url)
            .context("JDK installation failed")?;

        let container = if kind.needs_container() {
            Some(container::select(&self.build_dir, &self.containers, &self.hints)?)
        } else {
            None
        };

        if let Some(profile) = container {
            lifecycle::install(profile, &self.build_dir, &self.fetcher)
                .context("container installation failed")?;
            lifecycle::configure(profile, &self.build_dir, &self.fetcher)
                .context("container configuration failed")?;
            if kind.autostages_descriptor() {
                autostage::configure_web_descriptor(
                    kind,
                    &self.build_dir,
                    profile.web_root,
                    &self.fetcher,
                )
                .context("auto-reconfiguration failed")?;
            }
            lifecycle::repack(profile, &self.build_dir)
                .context("container repackaging failed")?;
        } else if kind == FrameworkKind::Play {
            autostage::stage_play(&self.build_dir, &self.fetcher)
                .context("Play staging failed")?;
        }

        let opts = profile_script::java_opts_for(kind, container.map(|p| p.kind));
        profile_script::write_profile_script(&self.build_dir, &opts)
            .context("failed to write the startup environment")?;

        let release = release::for_framework(kind, container);
        release::write_file(&self.build_dir, &release)?;
        info!("staged {kind} application");
        Ok(release)
    }

    /// Computes the release metadata without staging. After a `stage` run
    /// the hint files answer both detection questions, so this never
    /// re-derives a different answer from the mutated tree.
    pub fn release(&self) -> Result<Release> {
        let kind = self
            .detect()
            .ok_or_else(|| StageError::DetectionFailed(self.build_dir.clone()))?;
        let container = if kind.needs_container() {
            Some(container::select(&self.build_dir, &self.containers, &self.hints)?)
        } else {
            None
        };
        Ok(release::for_framework(kind, container))
    }
}
