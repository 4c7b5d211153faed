//! Framework detection.
//!
//! A fixed priority cascade, most specific first: Play, Grails, Spring,
//! Java Web, plain Java. The predicates are not mutually exclusive (a
//! Grails app ships Spring jars and a `web.xml`, satisfying three of them),
//! so the ordering is what keeps the answer deterministic. The first
//! positive answer is recorded in the framework hint and replayed on every
//! later call, because staging moves the very files the predicates inspect.

pub mod grails;
pub mod java_web;
pub mod plain_java;
pub mod play;
pub mod spring;

use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::container::ContainerRegistry;
use crate::hints::{HintCategory, HintStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameworkKind {
    Play,
    Grails,
    Spring,
    JavaWeb,
    PlainJava,
}

impl FrameworkKind {
    /// Display name, also the literal content of the framework hint file.
    pub fn name(&self) -> &'static str {
        match self {
            FrameworkKind::Play => "Play",
            FrameworkKind::Grails => "Grails",
            FrameworkKind::Spring => "Spring",
            FrameworkKind::JavaWeb => "Java Web",
            FrameworkKind::PlainJava => "Java",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }

    /// Every kind, in detection priority order.
    pub fn all() -> &'static [FrameworkKind] {
        &[
            FrameworkKind::Play,
            FrameworkKind::Grails,
            FrameworkKind::Spring,
            FrameworkKind::JavaWeb,
            FrameworkKind::PlainJava,
        ]
    }

    /// Whether staging this kind places the app inside a servlet container.
    pub fn needs_container(&self) -> bool {
        matches!(
            self,
            FrameworkKind::Grails | FrameworkKind::Spring | FrameworkKind::JavaWeb
        )
    }

    /// Whether the deployment descriptor gets the auto-reconfiguration edits.
    pub fn autostages_descriptor(&self) -> bool {
        matches!(self, FrameworkKind::Grails | FrameworkKind::Spring)
    }
}

impl fmt::Display for FrameworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs the cascade against `build_dir`, consulting the framework hint
/// first and recording a fresh positive answer into it.
pub fn detect(
    build_dir: &Path,
    containers: &ContainerRegistry,
    hints: &HintStore,
) -> Option<FrameworkKind> {
    if let Some(name) = hints.read(HintCategory::Framework) {
        match FrameworkKind::from_name(&name) {
            Some(kind) => {
                debug!("using hinted framework {name}");
                return Some(kind);
            }
            None => warn!("ignoring framework hint naming unknown kind {name}"),
        }
    }

    let kind = FrameworkKind::all()
        .iter()
        .copied()
        .find(|kind| applies(*kind, build_dir, containers))?;

    debug!("detected {kind} application in {}", build_dir.display());
    if let Err(err) = hints.write(HintCategory::Framework, kind.name()) {
        warn!("failed to record framework hint: {err:#}");
    }
    Some(kind)
}

fn applies(kind: FrameworkKind, build_dir: &Path, containers: &ContainerRegistry) -> bool {
    match kind {
        FrameworkKind::Play => play::applies(build_dir),
        FrameworkKind::Grails => grails::applies(build_dir, containers),
        FrameworkKind::Spring => spring::applies(build_dir, containers),
        FrameworkKind::JavaWeb => java_web::applies(build_dir, containers),
        FrameworkKind::PlainJava => plain_java::applies(build_dir),
    }
}
