//! Startup environment for the staged app: `.profile.d/java.sh`.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::container::ContainerKind;
use crate::framework::FrameworkKind;
use crate::jdk;

const TMPDIR_FLAG: &str = "-Djava.io.tmpdir=";

/// Ordered JVM option list rendered into `JAVA_OPTS`.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaOpts {
    entries: Vec<(String, String)>,
}

impl JavaOpts {
    pub fn base() -> Self {
        Self {
            entries: vec![
                ("-Xmx".to_string(), "$MEMORY_LIMIT".to_string()),
                ("-Xms".to_string(), "$MEMORY_LIMIT".to_string()),
                (TMPDIR_FLAG.to_string(), "\"$TMPDIR\"".to_string()),
            ],
        }
    }

    pub fn push(&mut self, flag: &str, value: &str) {
        self.entries.push((flag.to_string(), value.to_string()));
    }

    pub fn remove(&mut self, flag: &str) {
        self.entries.retain(|(f, _)| f != flag);
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(flag, value)| format!("{flag}{value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The option set for one framework/container combination: web containers
/// listen on the platform port, Tomcat manages its own temp dir, Play's
/// Netty picks its port from `$PORT`.
pub fn java_opts_for(kind: FrameworkKind, container: Option<ContainerKind>) -> JavaOpts {
    let mut opts = JavaOpts::base();
    match kind {
        FrameworkKind::Play => opts.push("-Dhttp.port=", "$PORT"),
        FrameworkKind::JavaWeb | FrameworkKind::Spring | FrameworkKind::Grails => {
            opts.push("-Dhttp.port=", "$VCAP_APP_PORT");
        }
        FrameworkKind::PlainJava => {}
    }
    if container == Some(ContainerKind::Tomcat) {
        opts.remove(TMPDIR_FLAG);
    }
    opts
}

/// Appends the JDK environment and default `JAVA_OPTS` to
/// `.profile.d/java.sh`.
pub fn write_profile_script(build_dir: &Path, opts: &JavaOpts) -> Result<()> {
    let profile_dir = build_dir.join(".profile.d");
    fs::create_dir_all(&profile_dir)
        .with_context(|| format!("failed to create {}", profile_dir.display()))?;
    let path = profile_dir.join("java.sh");
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(file, "export JAVA_HOME=\"$HOME/{}\"", jdk::JDK_DIR)?;
    writeln!(file, "export PATH=\"$HOME/{}/bin:$PATH\"", jdk::JDK_DIR)?;
    writeln!(file, "export JAVA_OPTS=${{JAVA_OPTS:-{}}}", opts.render())?;
    Ok(())
}
