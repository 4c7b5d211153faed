//! End-to-end staging against a pre-seeded artifact cache, so no network
//! tier is ever reached.

use javastage::config::StagingConfig;
use javastage::hints::{HintCategory, HintStore};
use javastage::pipeline::BuildPipeline;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const JDK_ARCHIVE: &str = "openjdk6-u25-heroku-temaki.tar.gz";
const TOMCAT_ARCHIVE: &str = "apache-tomcat-7.0.37.tar.gz";
const AUTORECONFIG_JAR: &str = "auto-reconfiguration-0.7.1.jar";

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

fn build_tar_gz(dest: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(dest).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, *path, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Cache carrying everything a Tomcat staging run fetches.
fn seeded_cache(cache: &Path) {
    // the JDK archive has no wrapper directory
    build_tar_gz(
        &cache.join(JDK_ARCHIVE),
        &[("bin/java", "#!/bin/sh\n"), ("lib/rt.jar", "rt")],
    );
    build_tar_gz(
        &cache.join(TOMCAT_ARCHIVE),
        &[
            ("apache-tomcat-7.0.37/bin/catalina.sh", "#!/bin/sh\n"),
            ("apache-tomcat-7.0.37/conf/web.xml", "<web-app/>"),
            ("apache-tomcat-7.0.37/LICENSE", "license"),
            ("apache-tomcat-7.0.37/temp/safeToDelete.tmp", "x"),
            ("apache-tomcat-7.0.37/webapps/docs/index.html", "docs"),
        ],
    );
    fs::write(cache.join(AUTORECONFIG_JAR), b"jar").unwrap();
    fs::write(cache.join("mysql-connector-java-5.1.12.jar"), b"jar").unwrap();
    fs::write(cache.join("postgresql-9.0-801.jdbc4.jar"), b"jar").unwrap();
}

fn config(cache: &Path) -> StagingConfig {
    StagingConfig {
        cache_dir: cache.to_path_buf(),
        blobstore_config: None,
        // never reached: every artifact is served from the cache
        vendor_url: "http://127.0.0.1:1".to_string(),
    }
}

#[test]
fn test_stages_spring_app_into_tomcat() {
    let cache = tempdir().unwrap();
    let build = tempdir().unwrap();
    seeded_cache(cache.path());

    touch(&build.path().join("WEB-INF/lib/spring-core-2.5.6.jar"));
    fs::write(
        build.path().join("WEB-INF").join("web.xml"),
        "<web-app><context-param><param-name>contextConfigLocation</param-name><param-value>foo</param-value></context-param></web-app>",
    )
    .unwrap();

    let pipeline = BuildPipeline::new(build.path(), config(cache.path())).unwrap();
    let release = pipeline.stage().unwrap();

    // the app moved into the container web root, the container to the root
    assert!(build.path().join("bin/catalina.sh").is_file());
    assert!(build
        .path()
        .join("webapps/ROOT/WEB-INF/lib/spring-core-2.5.6.jar")
        .is_file());

    // descriptor rewritten in place
    let web_xml =
        fs::read_to_string(build.path().join("webapps/ROOT/WEB-INF/web.xml")).unwrap();
    assert!(web_xml.contains(
        "foo classpath:META-INF/cloud/cloudfoundry-auto-reconfiguration-context.xml"
    ));
    assert!(web_xml.contains("contextInitializerClasses"));

    // auto-reconfiguration jar and drivers provisioned
    assert!(build
        .path()
        .join("webapps/ROOT/WEB-INF/lib")
        .join(AUTORECONFIG_JAR)
        .is_file());
    assert!(build
        .path()
        .join("lib/mysql-connector-java-5.1.12.jar")
        .is_file());

    // JDK, overlay, startup environment, release metadata
    assert!(build.path().join(".jdk/bin/java").is_file());
    let server_xml = fs::read_to_string(build.path().join("conf/server.xml")).unwrap();
    assert!(server_xml.contains("http.port"));
    let profile = fs::read_to_string(build.path().join(".profile.d/java.sh")).unwrap();
    assert!(profile.contains("-Dhttp.port=$VCAP_APP_PORT"));
    assert!(!profile.contains("java.io.tmpdir"));
    assert_eq!(
        release.default_process_types.get("web").unwrap(),
        "./bin/catalina.sh run"
    );
    assert!(build.path().join(".release.yml").is_file());

    // both hints recorded
    let hints = HintStore::new(build.path());
    assert_eq!(hints.read(HintCategory::Framework).unwrap(), "Spring");
    assert_eq!(hints.read(HintCategory::Container).unwrap(), "tomcat");

    // discarded container files are gone, cleared dirs remain
    assert!(!build.path().join("LICENSE").exists());
    assert_eq!(fs::read_dir(build.path().join("temp")).unwrap().count(), 0);

    // release recomputes from hints without re-scanning the mutated tree
    let recomputed = pipeline.release().unwrap();
    assert_eq!(recomputed, release);
}

#[test]
fn test_stages_plain_java_app() {
    let cache = tempdir().unwrap();
    let build = tempdir().unwrap();
    seeded_cache(cache.path());
    touch(&build.path().join("target/app.jar"));

    let pipeline = BuildPipeline::new(build.path(), config(cache.path())).unwrap();
    let release = pipeline.stage().unwrap();

    assert!(build.path().join(".jdk/bin/java").is_file());
    assert!(release.default_process_types.is_empty());
    let profile = fs::read_to_string(build.path().join(".profile.d/java.sh")).unwrap();
    assert!(profile.contains("export JAVA_HOME=\"$HOME/.jdk\""));
    // no container was installed
    assert!(!build.path().join("bin").exists());
}

#[test]
fn test_stage_fails_without_recognized_framework() {
    let cache = tempdir().unwrap();
    let build = tempdir().unwrap();
    seeded_cache(cache.path());
    touch(&build.path().join("README.md"));

    let pipeline = BuildPipeline::new(build.path(), config(cache.path())).unwrap();
    let err = pipeline.stage().unwrap_err();
    assert!(err.to_string().contains("no supported application framework"));
}

#[test]
fn test_stage_respects_java_version_request() {
    let cache = tempdir().unwrap();
    let build = tempdir().unwrap();
    seeded_cache(cache.path());
    touch(&build.path().join("target/app.jar"));
    fs::write(build.path().join("system.properties"), "java.runtime.version=11\n").unwrap();

    let pipeline = BuildPipeline::new(build.path(), config(cache.path())).unwrap();
    let err = pipeline.stage().unwrap_err();
    assert!(format!("{err:#}").contains("unsupported Java version"));
}
