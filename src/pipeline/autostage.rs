//! Auto-reconfiguration wiring per framework.
//!
//! Spring and Grails get their deployment descriptor rewritten in place and
//! the auto-reconfiguration jar dropped into `WEB-INF/lib`. Play gets the
//! jar in `lib/` plus a start-script rewrite that swaps the server
//! bootstrap class and extends the classpath with everything we added.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::descriptor::{ConfigurationBundle, DescriptorMutator, DescriptorTree};
use crate::drivers;
use crate::error::StageError;
use crate::fetch::ArtifactFetcher;
use crate::framework::FrameworkKind;
use crate::fsutil;

pub const AUTORECONFIG_JAR: &str = "auto-reconfiguration-0.7.1.jar";
pub const AUTORECONFIG_REPO_URL: &str =
    "https://s3.amazonaws.com/maven.springframework.org/milestone/org/cloudfoundry/auto-reconfiguration/0.7.1";

const AUTOSTAGING_CONTEXT: &str =
    "classpath:META-INF/cloud/cloudfoundry-auto-reconfiguration-context.xml";
const ANNOTATION_AUTOSTAGING_CLASS: &str =
    "org.cloudfoundry.reconfiguration.spring.web.CloudAppAnnotationConfigAutoReconfig";
const CONTEXT_INITIALIZER: &str =
    "org.cloudfoundry.reconfiguration.spring.CloudApplicationContextInitializer";

const SPRING_DISPATCHER: &str = "org.springframework.web.servlet.DispatcherServlet";
const GRAILS_DISPATCHER: &str = "org.codehaus.groovy.grails.web.servlet.GrailsDispatcherServlet";

const DEFAULT_APP_CONTEXT: &str = "/WEB-INF/applicationContext.xml";
const SERVLET_CONTEXT_SUFFIX: &str = "-servlet.xml";

const PLAY_SERVER_CLASS: &str = "play.core.server.NettyServer";
const PLAY_BOOTSTRAP_CLASS: &str = "org.cloudfoundry.reconfiguration.play.Bootstrap";

/// The injection bundle for one staged webapp.
pub fn bundle_for(kind: FrameworkKind, webapp: &Path) -> ConfigurationBundle {
    let (dispatcher, annotation, initializer) = match kind {
        FrameworkKind::Grails => (GRAILS_DISPATCHER, None, None),
        _ => (
            SPRING_DISPATCHER,
            Some(ANNOTATION_AUTOSTAGING_CLASS.to_string()),
            Some(CONTEXT_INITIALIZER.to_string()),
        ),
    };
    ConfigurationBundle {
        context_config_location: AUTOSTAGING_CONTEXT.to_string(),
        annotation_config_location: annotation,
        context_initializer_classes: initializer,
        dispatcher_servlet_class: dispatcher.to_string(),
        default_app_context: default_app_context(webapp),
        default_servlet_contexts: default_servlet_contexts(webapp),
    }
}

fn default_app_context(webapp: &Path) -> Option<String> {
    if webapp.join("WEB-INF/applicationContext.xml").is_file() {
        Some(DEFAULT_APP_CONTEXT.to_string())
    } else {
        None
    }
}

/// `WEB-INF/<name>-servlet.xml` files keyed by servlet name.
fn default_servlet_contexts(webapp: &Path) -> HashMap<String, String> {
    let mut contexts = HashMap::new();
    for path in fsutil::find_matches(
        &webapp.join("WEB-INF"),
        &format!("*{SERVLET_CONTEXT_SUFFIX}"),
    ) {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(servlet_name) = file_name.strip_suffix(SERVLET_CONTEXT_SUFFIX) else {
            continue;
        };
        contexts.insert(
            servlet_name.to_string(),
            format!("/WEB-INF/{file_name}"),
        );
    }
    contexts
}

/// Grails apps that bundle the platform's own Grails plugin wire themselves
/// up; staging must leave their descriptor alone.
pub fn grails_opted_out(webapp: &Path) -> bool {
    let grails_xml = webapp.join("WEB-INF/grails.xml");
    let Ok(content) = fs::read_to_string(&grails_xml) else {
        return false;
    };
    match DescriptorTree::parse(&content) {
        Ok(tree) => tree
            .root()
            .descendants_local("plugin")
            .iter()
            .any(|plugin| plugin.text().trim() == "CloudFoundryGrailsPlugin"),
        Err(err) => {
            warn!("ignoring unparseable {}: {err}", grails_xml.display());
            false
        }
    }
}

/// Rewrites `<webapp>/WEB-INF/web.xml` in place and provisions the
/// auto-reconfiguration jar into `WEB-INF/lib`.
pub fn configure_web_descriptor(
    kind: FrameworkKind,
    build_dir: &Path,
    web_root: &str,
    fetcher: &ArtifactFetcher,
) -> Result<()> {
    let webapp = build_dir.join(web_root);
    if kind == FrameworkKind::Grails && grails_opted_out(&webapp) {
        info!("Grails app manages its own cloud wiring, skipping auto-reconfiguration");
        return Ok(());
    }

    let descriptor_path = webapp.join("WEB-INF/web.xml");
    let content = fs::read_to_string(&descriptor_path)
        .with_context(|| format!("failed to read {}", descriptor_path.display()))?;
    let mut tree = DescriptorTree::parse(&content)
        .with_context(|| format!("failed to parse {}", descriptor_path.display()))?;

    let bundle = bundle_for(kind, &webapp);
    DescriptorMutator::new(&mut tree, &bundle).apply();

    let mutated = tree.serialize().context("failed to serialize descriptor")?;
    fs::write(&descriptor_path, mutated)
        .with_context(|| format!("failed to write {}", descriptor_path.display()))?;
    debug!("rewrote {}", descriptor_path.display());

    let lib = webapp.join("WEB-INF/lib");
    fs::create_dir_all(&lib)
        .with_context(|| format!("failed to create {}", lib.display()))?;
    fetcher.fetch(AUTORECONFIG_JAR, AUTORECONFIG_REPO_URL, &lib)?;
    Ok(())
}

/// Stages a Play dist: hoists the dist directory to the build root,
/// provisions drivers and the auto-reconfiguration jar into `lib/`, and
/// rewrites the start script.
pub fn stage_play(build_dir: &Path, fetcher: &ArtifactFetcher) -> Result<()> {
    let dist = find_play_dist_dir(build_dir)?;
    debug!("promoting Play dist {} to the build root", dist.display());
    fsutil::move_dir_contents(&dist, build_dir)?;
    fs::remove_dir_all(&dist)
        .with_context(|| format!("failed to remove {}", dist.display()))?;

    let lib = build_dir.join("lib");
    let installed = drivers::install_flat(&lib, fetcher)?;
    info!("configuring autostaging");
    fetcher.fetch(AUTORECONFIG_JAR, AUTORECONFIG_REPO_URL, &lib)?;

    let start = build_dir.join("start");
    let script = fs::read_to_string(&start)
        .with_context(|| format!("failed to read {}", start.display()))?;
    let mut additions = vec![AUTORECONFIG_JAR.to_string()];
    additions.extend(installed);
    if let Some(rewritten) = rewrite_start_script(&script, &additions) {
        fs::write(&start, rewritten)
            .with_context(|| format!("failed to write {}", start.display()))?;
    } else {
        warn!("no classpath found in the Play start script, leaving it unmodified");
    }
    Ok(())
}

/// Exactly one top-level directory holding both `start` and `lib/`.
fn find_play_dist_dir(build_dir: &Path) -> Result<PathBuf, StageError> {
    let Ok(entries) = fs::read_dir(build_dir) else {
        return Err(StageError::PlayDistLayout);
    };
    let dists: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir() && p.join("start").is_file() && p.join("lib").is_dir())
        .collect();
    match dists.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(StageError::PlayDistLayout),
    }
}

/// Extends the `-cp` argument with `lib/<jar>` entries and swaps the Netty
/// server class for the reconfiguration bootstrap. Scripts without a
/// recognizable classpath come back unchanged as `None`.
fn rewrite_start_script(script: &str, jar_names: &[String]) -> Option<String> {
    let Ok(re) = Regex::new(r#"-cp\s+(?:"(?P<quoted>[^"]+)"|(?P<bare>\S+))"#) else {
        return None;
    };
    let captures = re.captures(script)?;

    let additions: String = jar_names
        .iter()
        .map(|jar| format!(":`dirname $0`/lib/{jar}"))
        .collect();

    let (range, replacement) = if let Some(quoted) = captures.name("quoted") {
        (
            quoted.range(),
            format!("{}{}", quoted.as_str(), additions),
        )
    } else {
        let bare = captures.name("bare")?;
        (bare.range(), format!("{}{}", bare.as_str(), additions))
    };

    let mut rewritten = String::with_capacity(script.len() + replacement.len());
    rewritten.push_str(&script[..range.start]);
    rewritten.push_str(&replacement);
    rewritten.push_str(&script[range.end..]);
    Some(rewritten.replace(PLAY_SERVER_CLASS, PLAY_BOOTSTRAP_CLASS))
}
