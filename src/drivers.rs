//! Database driver provisioning.
//!
//! A user-supplied driver always wins: when the detection glob already
//! matches under the container's library location the driver is skipped,
//! never overwritten. Only newly installed jar names are reported so the
//! Play start-script rewrite can extend the classpath with exactly what was
//! added.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::container::ContainerKind;
use crate::fetch::ArtifactFetcher;
use crate::fsutil;

/// One logical JDBC driver.
#[derive(Debug, Clone)]
pub struct DriverSpec {
    pub name: &'static str,
    /// Glob that recognizes an already-present copy of this driver.
    pub search_glob: &'static str,
    pub file_name: &'static str,
    pub base_url: &'static str,
    /// Module directory for containers with a modular library layout.
    pub module_path: &'static str,
}

/// When you update a driver version, check the matching JBoss `module.xml`
/// overlay as well.
pub const DRIVERS: &[DriverSpec] = &[
    DriverSpec {
        name: "mysql",
        search_glob: "*mysql-connector-java-*.jar",
        file_name: "mysql-connector-java-5.1.12.jar",
        base_url: "http://search.maven.org/remotecontent?filepath=mysql/mysql-connector-java/5.1.12",
        module_path: "com/mysql/main",
    },
    DriverSpec {
        name: "postgresql",
        search_glob: "*postgresql-*.jdbc*.jar",
        file_name: "postgresql-9.0-801.jdbc4.jar",
        base_url: "http://search.maven.org/remotecontent?filepath=postgresql/postgresql/9.0-801.jdbc4",
        module_path: "org/postgresql/main",
    },
];

/// Installs missing drivers for the given container layout rooted at
/// `build_dir`. Returns the newly installed jar names in table order.
pub fn install_for(
    kind: ContainerKind,
    build_dir: &Path,
    fetcher: &ArtifactFetcher,
) -> Result<Vec<String>> {
    match kind {
        ContainerKind::Tomcat => install_flat(&build_dir.join("lib"), fetcher),
        ContainerKind::JBossAs => install_modules(build_dir, fetcher),
    }
}

/// Flat layout: every driver jar goes straight into `lib_dir`.
pub fn install_flat(lib_dir: &Path, fetcher: &ArtifactFetcher) -> Result<Vec<String>> {
    let mut added = Vec::new();
    for spec in DRIVERS {
        if fsutil::dir_has_match(lib_dir, spec.search_glob) {
            debug!("{} driver already present, skipping", spec.name);
            continue;
        }
        fs::create_dir_all(lib_dir)
            .with_context(|| format!("failed to create {}", lib_dir.display()))?;
        info!("installing {} driver", spec.name);
        fetcher.fetch(spec.file_name, spec.base_url, lib_dir)?;
        added.push(spec.file_name.to_string());
    }
    Ok(added)
}

/// Modular layout: each driver gets its own directory under `modules/`; the
/// matching `module.xml` arrives with the container resource overlay.
fn install_modules(build_dir: &Path, fetcher: &ArtifactFetcher) -> Result<Vec<String>> {
    let modules = build_dir.join("modules");
    let mut added = Vec::new();
    for spec in DRIVERS {
        if !fsutil::find_matches_recursive(&modules, spec.search_glob).is_empty() {
            debug!("{} driver already present, skipping", spec.name);
            continue;
        }
        let module_dir = modules.join(spec.module_path);
        fs::create_dir_all(&module_dir)
            .with_context(|| format!("failed to create {}", module_dir.display()))?;
        info!("installing {} driver", spec.name);
        fetcher.fetch(spec.file_name, spec.base_url, &module_dir)?;
        added.push(spec.file_name.to_string());
    }
    Ok(added)
}
