//! Java Web: a deployment descriptor at the root, or any registered
//! container's own descriptor sniff. A JBoss-only descriptor counts as a
//! web app even without a `web.xml`.

use std::path::Path;

use crate::container::ContainerRegistry;

pub fn applies(build_dir: &Path, containers: &ContainerRegistry) -> bool {
    build_dir.join("WEB-INF/web.xml").is_file() || containers.any_applicable(build_dir)
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
    fn test_detects_web_xml() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/web.xml"));
        assert!(applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }

    #[test]
    fn test_detects_container_specific_descriptor() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/jboss-web.xml"));
        assert!(applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }

    #[test]
    fn test_rejects_empty_tree() {
        let tmp = tempdir().unwrap();
        assert!(!applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }
}
