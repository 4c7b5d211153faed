//! Play: a framework jar inside any `lib/` directory. Play dists never
//! carry a `web.xml`, so this outranks every other predicate.

use std::path::Path;

use crate::fsutil;

pub fn applies(build_dir: &Path) -> bool {
    fsutil::find_matches_recursive(build_dir, "play.*.jar")
        .iter()
        .any(|path| {
            path.parent()
                .and_then(|dir| dir.file_name())
                .map(|name| name == "lib")
                .unwrap_or(false)
        })
}
