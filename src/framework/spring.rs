//! Spring: framework classes or jars under `WEB-INF`, checked at the root
//! and nested under every registered container web root, since a later
//! build phase may re-detect after the app has been moved into a container.

use std::path::{Path, PathBuf};

use crate::container::ContainerRegistry;
use crate::fsutil;

const SPRING_JAR_GLOBS: &[&str] = &["spring-core*.jar", "org.springframework.core*.jar"];

pub fn applies(build_dir: &Path, containers: &ContainerRegistry) -> bool {
    search_roots(build_dir, containers)
        .iter()
        .any(|root| spring_files_found(root))
}

fn spring_files_found(root: &Path) -> bool {
    if root.join("WEB-INF/classes/org/springframework").is_dir() {
        return true;
    }
    let lib = root.join("WEB-INF/lib");
    SPRING_JAR_GLOBS
        .iter()
        .any(|glob| fsutil::dir_has_match(&lib, glob))
}

pub(super) fn search_roots(build_dir: &Path, containers: &ContainerRegistry) -> Vec<PathBuf> {
    let mut roots = vec![build_dir.to_path_buf()];
    roots.extend(containers.web_roots().map(|web_root| build_dir.join(web_root)));
    roots
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
    fn test_detects_springframework_class_dir() {
        let tmp = tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("WEB-INF/classes/org/springframework")).unwrap();
        assert!(applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }

    #[test]
    fn test_detects_short_name_jar() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/lib/spring-core-2.5.6.jar"));
        assert!(applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }

    #[test]
    fn test_detects_full_name_jar() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/lib/org.springframework.core-3.0.4.RELEASE.jar"));
        assert!(applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }

    #[test]
    fn test_detects_app_nested_in_container_web_root() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("webapps/ROOT/WEB-INF/lib/spring-core-2.5.6.jar"));
        assert!(applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }

    #[test]
    fn test_rejects_tree_without_spring() {
        let tmp = tempdir().unwrap();
        touch(&tmp.path().join("WEB-INF/lib/commons-lang-2.6.jar"));
        assert!(!applies(tmp.path(), &ContainerRegistry::with_defaults()));
    }
}
