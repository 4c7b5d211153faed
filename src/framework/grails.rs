//! Grails: jars in the `grails-web` library directory, at the root or
//! nested under a container web root. Checked before Spring because every
//! Grails app also looks like a Spring app.

use std::path::Path;

use super::spring;
use crate::container::ContainerRegistry;
use crate::fsutil;

const GRAILS_WEB_DIR: &str = "WEB-INF/lib/grails-web";

pub fn applies(build_dir: &Path, containers: &ContainerRegistry) -> bool {
    spring::search_roots(build_dir, containers)
        .iter()
        .any(|root| fsutil::dir_has_match(&root.join(GRAILS_WEB_DIR), "*.jar"))
}
