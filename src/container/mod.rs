//! Servlet container profiles and selection.
//!
//! Containers form a closed set of tagged variants with their static profile
//! data registered once at startup. The registry is an explicit value passed
//! into the pipeline, never ambient global state. Registration order matters:
//! when no explicit override names a container, the first registered profile
//! whose `applicable` sniff matches wins.

pub mod jboss_as;
pub mod lifecycle;
pub mod tomcat;

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::hints::{HintCategory, HintStore};
use crate::sysprops;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Tomcat,
    JBossAs,
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Tomcat => "tomcat",
            ContainerKind::JBossAs => "jboss-as",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tomcat" => Some(ContainerKind::Tomcat),
            "jboss-as" => Some(ContainerKind::JBossAs),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable, versioned definition of one servlet container.
#[derive(Debug, Clone)]
pub struct ContainerProfile {
    pub kind: ContainerKind,
    pub version: &'static str,
    pub archive_url: &'static str,
    /// Glob naming the archive's top-level wrapper directory.
    pub name_pattern: &'static str,
    /// Entries removed from the unpacked container; a trailing `/*` clears a
    /// directory's contents but keeps it.
    pub discarded_files: &'static [&'static str],
    /// Where the exploded application lives, relative to the build root.
    pub web_root: &'static str,
    /// Binary whose presence proves a successful install.
    pub startup_bin: &'static str,
    /// Command line the platform runs for the `web` process type.
    pub start_command: &'static str,
}

impl ContainerProfile {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Dot-prefixed staging directory so the webapp move leaves it behind.
    pub fn staging_dir(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(format!(".{}", self.name()))
    }

    /// Container-specific descriptor sniff, evaluated against the app tree
    /// before the app has been placed into any container.
    pub fn applicable(&self, build_dir: &Path) -> bool {
        match self.kind {
            ContainerKind::Tomcat => tomcat::applicable(build_dir),
            ContainerKind::JBossAs => jboss_as::applicable(build_dir),
        }
    }

    pub fn process_types(&self) -> BTreeMap<String, String> {
        let mut types = BTreeMap::new();
        types.insert("web".to_string(), self.start_command.to_string());
        types
    }

    /// Static files copied onto the build root after configuration, as
    /// `(relative path, content)` pairs.
    pub fn resource_overlay(&self) -> &'static [(&'static str, &'static str)] {
        match self.kind {
            ContainerKind::Tomcat => tomcat::RESOURCE_OVERLAY,
            ContainerKind::JBossAs => jboss_as::RESOURCE_OVERLAY,
        }
    }
}

/// Name-ordered registry of container profiles plus the configured default.
#[derive(Debug, Clone)]
pub struct ContainerRegistry {
    profiles: Vec<ContainerProfile>,
    default_kind: ContainerKind,
}

impl ContainerRegistry {
    pub fn new(default_kind: ContainerKind) -> Self {
        Self {
            profiles: Vec::new(),
            default_kind,
        }
    }

    /// The registry used by the staging pipeline: JBoss first (its sniff is
    /// specific), Tomcat as the fallback default.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(ContainerKind::Tomcat);
        registry.register(jboss_as::profile());
        registry.register(tomcat::profile());
        registry
    }

    pub fn register(&mut self, profile: ContainerProfile) {
        self.profiles.push(profile);
    }

    pub fn get(&self, name: &str) -> Option<&ContainerProfile> {
        self.profiles.iter().find(|p| p.name() == name)
    }

    pub fn all(&self) -> &[ContainerProfile] {
        &self.profiles
    }

    pub fn default_profile(&self) -> Option<&ContainerProfile> {
        self.profiles.iter().find(|p| p.kind == self.default_kind)
    }

    /// True when any registered container's sniff matches the app tree.
    pub fn any_applicable(&self, build_dir: &Path) -> bool {
        self.profiles.iter().any(|p| p.applicable(build_dir))
    }

    /// Registered web roots, used as fallback search paths by detectors that
    /// must also recognize apps already nested inside a container.
    pub fn web_roots(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles.iter().map(|p| p.web_root)
    }
}

/// Picks the container for a Java-Web-family app: the recorded hint, else an
/// explicit `web.container` override from the app's properties, else the
/// first applicable profile, else the registry default. The fresh decision
/// is recorded in the container hint.
pub fn select<'a>(
    build_dir: &Path,
    registry: &'a ContainerRegistry,
    hints: &HintStore,
) -> Result<&'a ContainerProfile> {
    if let Some(name) = hints.read(HintCategory::Container) {
        if let Some(profile) = registry.get(&name) {
            debug!("using hinted container {name}");
            return Ok(profile);
        }
        warn!("ignoring container hint naming unknown container {name}");
    }

    let chosen = explicit_override(build_dir, registry)
        .or_else(|| registry.profiles.iter().find(|p| p.applicable(build_dir)))
        .or_else(|| registry.default_profile())
        .ok_or_else(|| anyhow!("no servlet container registered"))?;

    if let Err(err) = hints.write(HintCategory::Container, chosen.name()) {
        warn!("failed to record container hint: {err:#}");
    }
    Ok(chosen)
}

fn explicit_override<'a>(
    build_dir: &Path,
    registry: &'a ContainerRegistry,
) -> Option<&'a ContainerProfile> {
    let name = sysprops::system_properties(build_dir)
        .get(sysprops::WEB_CONTAINER)
        .cloned()?;
    match registry.get(&name) {
        Some(profile) => Some(profile),
        None => {
            warn!("ignoring {}={name}: unknown container", sysprops::WEB_CONTAINER);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_registry_defaults() {
        let registry = ContainerRegistry::with_defaults();
        assert_eq!(registry.all().len(), 2);
        assert_eq!(registry.default_profile().unwrap().kind, ContainerKind::Tomcat);
        assert!(registry.get("tomcat").is_some());
        assert!(registry.get("jboss-as").is_some());
        assert!(registry.get("jetty").is_none());
    }

    #[test]
    fn test_select_falls_back_to_default() {
        let tmp = tempdir().unwrap();
        let registry = ContainerRegistry::with_defaults();
        let hints = HintStore::new(tmp.path());

        let chosen = select(tmp.path(), &registry, &hints).unwrap();
        assert_eq!(chosen.kind, ContainerKind::Tomcat);
        assert_eq!(hints.read(HintCategory::Container).unwrap(), "tomcat");
    }

    #[test]
    fn test_select_prefers_applicable_profile() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/jboss-web.xml"));
        let registry = ContainerRegistry::with_defaults();
        let hints = HintStore::new(tmp.path());

        let chosen = select(tmp.path(), &registry, &hints).unwrap();
        assert_eq!(chosen.kind, ContainerKind::JBossAs);
    }

    #[test]
    fn test_select_honors_properties_override() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/web.xml"));
        fs::write(tmp.path().join("system.properties"), "web.container=jboss-as\n").unwrap();
        let registry = ContainerRegistry::with_defaults();
        let hints = HintStore::new(tmp.path());

        let chosen = select(tmp.path(), &registry, &hints).unwrap();
        assert_eq!(chosen.kind, ContainerKind::JBossAs);
    }

    #[test]
    fn test_select_is_memoized_by_hint() {
        let tmp = tempdir().unwrap();
        let registry = ContainerRegistry::with_defaults();
        let hints = HintStore::new(tmp.path());
        hints.write(HintCategory::Container, "jboss-as").unwrap();

        // nothing in the tree points at JBoss, only the hint does
        let chosen = select(tmp.path(), &registry, &hints).unwrap();
        assert_eq!(chosen.kind, ContainerKind::JBossAs);
    }
}
