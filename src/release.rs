//! Release metadata: the document the platform reads to learn how to run
//! the staged app.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::container::ContainerProfile;
use crate::framework::FrameworkKind;

/// Recorded at the build root by `stage` for later phases.
pub const RELEASE_FILE: &str = ".release.yml";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Release {
    pub addons: Vec<String>,
    pub config_vars: BTreeMap<String, String>,
    pub default_process_types: BTreeMap<String, String>,
}

impl Release {
    pub fn new(default_process_types: BTreeMap<String, String>) -> Self {
        Self {
            addons: Vec::new(),
            config_vars: BTreeMap::new(),
            default_process_types,
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize release metadata")
    }
}

/// Process types per framework: containers bring their startup script, Play
/// ships its own, plain Java has nothing to declare.
pub fn for_framework(kind: FrameworkKind, container: Option<&ContainerProfile>) -> Release {
    let mut types = BTreeMap::new();
    match kind {
        FrameworkKind::Play => {
            types.insert("web".to_string(), "./start $JAVA_OPTS".to_string());
        }
        FrameworkKind::PlainJava => {}
        _ => {
            if let Some(profile) = container {
                types = profile.process_types();
            }
        }
    }
    Release::new(types)
}

pub fn write_file(build_dir: &Path, release: &Release) -> Result<()> {
    let path = build_dir.join(RELEASE_FILE);
    fs::write(&path, release.to_yaml()?)
        .with_context(|| format!("failed to write {}", path.display()))
}
