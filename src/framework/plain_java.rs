//! Plain Java: any compiled artifact anywhere in the tree.

use std::path::Path;

use crate::fsutil;

pub fn applies(build_dir: &Path) -> bool {
    fsutil::has_file_with_extension(build_dir, "jar")
        || fsutil::has_file_with_extension(build_dir, "class")
}
