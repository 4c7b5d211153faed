//! Tomcat container profile.

use std::path::Path;

use super::{ContainerKind, ContainerProfile};

const TOMCAT_URL: &str =
    "http://archive.apache.org/dist/tomcat/tomcat-7/v7.0.37/bin/apache-tomcat-7.0.37.tar.gz";
const TOMCAT_VERSION: &str = "7.0.37";

const DISCARDED_FILES: &[&str] = &[
    "NOTICE",
    "RELEASE-NOTES",
    "RUNNING.txt",
    "LICENSE",
    "temp/*",
    "webapps/*",
    "work/*",
    "logs",
];

pub const RESOURCE_OVERLAY: &[(&str, &str)] = &[(
    "conf/server.xml",
    include_str!("../../resources/tomcat/conf/server.xml"),
)];

pub fn profile() -> ContainerProfile {
    ContainerProfile {
        kind: ContainerKind::Tomcat,
        version: TOMCAT_VERSION,
        archive_url: TOMCAT_URL,
        name_pattern: "apache-tomcat-*",
        discarded_files: DISCARDED_FILES,
        web_root: "webapps/ROOT",
        startup_bin: "bin/catalina.sh",
        start_command: "./bin/catalina.sh run",
    }
}

pub fn applicable(build_dir: &Path) -> bool {
    build_dir.join("WEB-INF/web.xml").is_file()
}
