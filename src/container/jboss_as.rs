//! JBoss AS container profile.

use std::path::Path;

use super::{ContainerKind, ContainerProfile};
use crate::fsutil;

const JBOSSAS_URL: &str =
    "http://download.jboss.org/jbossas/7.1/jboss-as-7.1.1.Final/jboss-as-7.1.1.Final.tar.gz";
const JBOSSAS_VERSION: &str = "7.1.1";

const DISCARDED_FILES: &[&str] = &[
    "copyright.txt",
    "LICENSE.txt",
    "README.txt",
    "docs/*",
    "standalone/deployments/*",
    "welcome-content/*",
];

pub const RESOURCE_OVERLAY: &[(&str, &str)] = &[
    (
        "standalone/configuration/standalone.xml",
        include_str!("../../resources/jboss-as/standalone/configuration/standalone.xml"),
    ),
    (
        "modules/com/mysql/main/module.xml",
        include_str!("../../resources/jboss-as/modules/com/mysql/main/module.xml"),
    ),
    (
        "modules/org/postgresql/main/module.xml",
        include_str!("../../resources/jboss-as/modules/org/postgresql/main/module.xml"),
    ),
];

pub fn profile() -> ContainerProfile {
    ContainerProfile {
        kind: ContainerKind::JBossAs,
        version: JBOSSAS_VERSION,
        archive_url: JBOSSAS_URL,
        name_pattern: "jboss-as-*",
        discarded_files: DISCARDED_FILES,
        web_root: "standalone/deployments/ROOT.war",
        startup_bin: "bin/standalone.sh",
        start_command: "./bin/standalone.sh",
    }
}

/// JBoss-only descriptors: `jboss-web.xml`, deployable datasources, or a
/// JPA persistence unit.
pub fn applicable(build_dir: &Path) -> bool {
    build_dir.join("WEB-INF/jboss-web.xml").is_file()
        || fsutil::dir_has_match(&build_dir.join("WEB-INF"), "*-ds.xml")
        || build_dir
            .join("WEB-INF/classes/META-INF/persistence.xml")
            .is_file()
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
    fn test_applicable_with_jboss_web_xml() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/jboss-web.xml"));
        assert!(applicable(tmp.path()));
    }

    #[test]
    fn test_applicable_with_datasource_descriptor() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/mysql-ds.xml"));
        assert!(applicable(tmp.path()));
    }

    #[test]
    fn test_applicable_with_persistence_unit() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/classes/META-INF/persistence.xml"));
        assert!(applicable(tmp.path()));
    }

    #[test]
    fn test_not_applicable_with_plain_web_xml() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/web.xml"));
        assert!(!applicable(tmp.path()));
    }

    #[test]
    fn test_profile_shape() {
        let profile = profile();
        assert_eq!(profile.name(), "jboss-as");
        assert_eq!(profile.web_root, "standalone/deployments/ROOT.war");
        assert_eq!(
            profile.process_types().get("web").unwrap(),
            "./bin/standalone.sh"
        );
    }

    #[test]
    fn test_overlay_carries_driver_modules() {
        let paths: Vec<&str> = RESOURCE_OVERLAY.iter().map(|(p, _)| *p).collect();
        assert!(paths.contains(&"modules/com/mysql/main/module.xml"));
        assert!(paths.contains(&"modules/org/postgresql/main/module.xml"));
    }
}
