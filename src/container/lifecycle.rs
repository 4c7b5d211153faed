//! Container install / configure / repack.
//!
//! `install` and `configure` are shared across containers and driven by the
//! profile data; `repack` is the one genuinely container-specific step
//! (JBoss deploys a packed archive where Tomcat serves the exploded tree).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::{ContainerKind, ContainerProfile};
use crate::archive;
use crate::drivers;
use crate::error::StageError;
use crate::fetch::ArtifactFetcher;
use crate::fsutil;
use crate::jdk;

/// Fetches and unpacks the container into its staging directory and checks
/// the startup binary arrived. The downloaded tarball is removed whether or
/// not the install succeeds; a missing startup binary is fatal because
/// nothing downstream can run without the container.
pub fn install(
    profile: &ContainerProfile,
    build_dir: &Path,
    fetcher: &ArtifactFetcher,
) -> Result<()> {
    let staging = profile.staging_dir(build_dir);
    fs::create_dir_all(&staging)
        .with_context(|| format!("failed to create {}", staging.display()))?;

    info!(
        "downloading {}-{}: {}",
        profile.name(),
        profile.version,
        profile.archive_url
    );
    let (base_url, file_name) = split_url(profile.archive_url);
    let tarball = fetcher.fetch(file_name, base_url, &staging)?;

    info!("unpacking {} to {}", profile.name(), staging.display());
    let result = archive::extract_tar_gz(&tarball, &staging)
        .and_then(|_| archive::strip_wrapper_dir(&staging, profile.name_pattern));
    let _ = fs::remove_file(&tarball);
    result?;

    if !staging.join(profile.startup_bin).is_file() {
        return Err(StageError::ContainerInstall {
            container: profile.name().to_string(),
            binary: profile.startup_bin.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Strips the container's discarded files, moves the application into the
/// web root, hoists the container tree up to the build root, provisions
/// database drivers and lays down the static resource overlay. Returns the
/// newly installed driver jar names.
pub fn configure(
    profile: &ContainerProfile,
    build_dir: &Path,
    fetcher: &ArtifactFetcher,
) -> Result<Vec<String>> {
    let staging = profile.staging_dir(build_dir);

    fsutil::remove_discarded(&staging, profile.discarded_files)?;

    debug!("moving application into {}", profile.web_root);
    fsutil::move_visible_entries(build_dir, &staging.join(profile.web_root))?;

    debug!("moving {} to the build root", profile.name());
    fsutil::move_dir_contents(&staging, build_dir)?;
    fs::remove_dir_all(&staging)
        .with_context(|| format!("failed to remove {}", staging.display()))?;

    let installed = drivers::install_for(profile.kind, build_dir, fetcher)?;

    for (relative, content) in profile.resource_overlay() {
        let target = build_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&target, content)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }

    Ok(installed)
}

/// Container-specific repackaging after configuration (and after any
/// descriptor mutation). Tomcat serves the exploded web root as-is.
pub fn repack(profile: &ContainerProfile, build_dir: &Path) -> Result<()> {
    match profile.kind {
        ContainerKind::Tomcat => Ok(()),
        ContainerKind::JBossAs => repack_war(profile, build_dir),
    }
}

/// Relocates deployable `*-ds.xml` datasources next to the deployment, then
/// replaces the exploded web root with a single packed archive built by the
/// staged JDK's `jar` tool.
fn repack_war(profile: &ContainerProfile, build_dir: &Path) -> Result<()> {
    let web_root = build_dir.join(profile.web_root);
    let deployments = web_root
        .parent()
        .ok_or_else(|| StageError::Repack(web_root.clone()))?
        .to_path_buf();

    for descriptor in fsutil::find_matches(&web_root.join("WEB-INF"), "*-ds.xml") {
        let name = descriptor
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        debug!("relocating datasource descriptor {}", descriptor.display());
        fsutil::move_entry(&descriptor, &deployments.join(name))?;
    }

    let war_name = web_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ROOT.war".to_string());
    let packed = build_dir.join(format!(".{war_name}"));
    let jdk_home = build_dir.join(jdk::JDK_DIR);

    info!("repacking {war_name}");
    let status = Command::new(jdk_home.join("bin/jar"))
        .env("JAVA_HOME", &jdk_home)
        .arg("cf")
        .arg(&packed)
        .arg("-C")
        .arg(&web_root)
        .arg(".")
        .status();
    match status {
        Ok(status) if status.success() => {}
        Ok(status) => debug!("jar exited with {status}"),
        Err(err) => debug!("failed to run jar: {err}"),
    }

    if !packed.is_file() {
        return Err(StageError::Repack(web_root).into());
    }
    fs::remove_dir_all(&web_root)
        .with_context(|| format!("failed to remove {}", web_root.display()))?;
    fs::rename(&packed, &web_root).with_context(|| {
        format!("failed to move {} to {}", packed.display(), web_root.display())
    })?;
    Ok(())
}

fn split_url(url: &str) -> (&str, &str) {
    match url.rsplit_once('/') {
        Some((base, file)) => (base, file),
        None => ("", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{jboss_as, tomcat};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn fake_container_tar_gz(dest: &Path, wrapper: &str, bin: &str) {
        let file = fs::File::create(dest).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, content) in [
            (format!("{wrapper}/{bin}"), "#!/bin/sh\n"),
            (format!("{wrapper}/LICENSE"), "license text"),
            (format!("{wrapper}/temp/junk"), "x"),
            (format!("{wrapper}/webapps/docs/index.html"), "docs"),
            (format!("{wrapper}/lib/catalina.jar"), "jar"),
        ] {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn seeded_fetcher(cache: &Path) -> ArtifactFetcher {
        fake_container_tar_gz(
            &cache.join("apache-tomcat-7.0.37.tar.gz"),
            "apache-tomcat-7.0.37",
            "bin/catalina.sh",
        );
        for spec in drivers::DRIVERS {
            fs::write(cache.join(spec.file_name), b"jar").unwrap();
        }
        ArtifactFetcher::new(cache.to_path_buf(), None).unwrap()
    }

    #[test]
    fn test_install_unpacks_and_verifies() {
        let cache = tempdir().unwrap();
        let build = tempdir().unwrap();
        let fetcher = seeded_fetcher(cache.path());
        let profile = tomcat::profile();

        install(&profile, build.path(), &fetcher).unwrap();

        let staging = build.path().join(".tomcat");
        assert!(staging.join("bin/catalina.sh").is_file());
        assert!(!staging.join("apache-tomcat-7.0.37.tar.gz").exists());
        assert!(!staging.join("apache-tomcat-7.0.37").exists());
    }

    #[test]
    fn test_install_fails_without_startup_binary() {
        let cache = tempdir().unwrap();
        let build = tempdir().unwrap();
        // archive whose wrapper holds no catalina.sh
        fake_container_tar_gz(
            &cache.path().join("apache-tomcat-7.0.37.tar.gz"),
            "apache-tomcat-7.0.37",
            "bin/other.sh",
        );
        let fetcher = ArtifactFetcher::new(cache.path().to_path_buf(), None).unwrap();
        let profile = tomcat::profile();

        let err = install(&profile, build.path(), &fetcher).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StageError>(),
            Some(StageError::ContainerInstall { .. })
        ));
        // guaranteed cleanup of the tarball
        assert!(!build.path().join(".tomcat/apache-tomcat-7.0.37.tar.gz").exists());
    }

    #[test]
    fn test_configure_moves_app_and_discards_files() {
        let cache = tempdir().unwrap();
        let build = tempdir().unwrap();
        let fetcher = seeded_fetcher(cache.path());
        let profile = tomcat::profile();
        touch(&build.path().join("WEB-INF/web.xml"));

        install(&profile, build.path(), &fetcher).unwrap();
        configure(&profile, build.path(), &fetcher).unwrap();

        // app landed in the web root, container was hoisted to the root
        assert!(build.path().join("webapps/ROOT/WEB-INF/web.xml").is_file());
        assert!(build.path().join("bin/catalina.sh").is_file());
        assert!(!build.path().join(".tomcat").exists());
        // discarded entries are gone, cleared dirs stay
        assert!(!build.path().join("LICENSE").exists());
        assert_eq!(
            fs::read_dir(build.path().join("temp")).unwrap().count(),
            0
        );
        // drivers in the flat lib dir, overlay applied
        assert!(build
            .path()
            .join("lib/mysql-connector-java-5.1.12.jar")
            .is_file());
        let server_xml = fs::read_to_string(build.path().join("conf/server.xml")).unwrap();
        assert!(server_xml.contains("http.port"));
    }

    #[test]
    fn test_repack_is_noop_for_tomcat() {
        let build = tempdir().unwrap();
        repack(&tomcat::profile(), build.path()).unwrap();
    }

    #[test]
    fn test_repack_war_replaces_exploded_root_and_relocates_datasources() {
        let build = tempdir().unwrap();
        let profile = jboss_as::profile();
        let web_root = build.path().join(profile.web_root);
        touch(&web_root.join("WEB-INF/web.xml"));
        touch(&web_root.join("WEB-INF/mysql-ds.xml"));

        // stub jar tool: `jar cf <archive> -C <dir> .`
        let jar = build.path().join(".jdk/bin/jar");
        fs::create_dir_all(jar.parent().unwrap()).unwrap();
        fs::write(&jar, "#!/bin/sh\necho war > \"$2\"\n").unwrap();
        fs::set_permissions(&jar, fs::Permissions::from_mode(0o755)).unwrap();

        repack(&profile, build.path()).unwrap();

        assert!(web_root.is_file(), "web root must become a packed archive");
        assert!(build
            .path()
            .join("standalone/deployments/mysql-ds.xml")
            .is_file());
    }

    #[test]
    fn test_repack_war_without_jar_tool_is_fatal() {
        let build = tempdir().unwrap();
        let profile = jboss_as::profile();
        touch(&build.path().join(profile.web_root).join("WEB-INF/web.xml"));

        let err = repack(&profile, build.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StageError>(),
            Some(StageError::Repack(_))
        ));
    }
}
