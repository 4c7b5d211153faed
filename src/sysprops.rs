//! `system.properties` lookup.
//!
//! The application may carry a `system.properties` file anywhere in its
//! tree; the first one found (sorted walk) wins. It selects the Java runtime
//! version and may override the servlet container choice.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::fsutil;

pub const JAVA_RUNTIME_VERSION: &str = "java.runtime.version";
pub const WEB_CONTAINER: &str = "web.container";

/// Properties from the build's `system.properties`, empty when absent.
pub fn system_properties(build_dir: &Path) -> HashMap<String, String> {
    let files = fsutil::find_matches_recursive(build_dir, "system.properties");
    match files.first() {
        Some(path) => parse(&fs::read_to_string(path).unwrap_or_default()),
        None => HashMap::new(),
    }
}

/// Parses `key=value` lines; `#` lines are comments and a trailing
/// `//comment` on a value is dropped.
pub fn parse(content: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = match value.split_once("//") {
                Some((v, _)) => v,
                None => value,
            };
            properties.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_plain_and_commented_values() {
        let props = parse("java.runtime.version=1.7//latest\n# comment\nweb.container=jboss-as\n");
        assert_eq!(props.get(JAVA_RUNTIME_VERSION).unwrap(), "1.7");
        assert_eq!(props.get(WEB_CONTAINER).unwrap(), "jboss-as");
    }

    #[test]
    fn test_nested_file_is_found() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("WEB-INF/classes");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("system.properties"), "java.runtime.version=1.8\n").unwrap();

        let props = system_properties(tmp.path());
        assert_eq!(props.get(JAVA_RUNTIME_VERSION).unwrap(), "1.8");
    }

    #[test]
    fn test_missing_file_yields_empty_map() {
        let tmp = tempdir().unwrap();
        assert!(system_properties(tmp.path()).is_empty());
    }
}
