//! Subcommand handlers, each returning the process exit code.

use tracing::error;

use super::DirArgs;
use crate::config::StagingConfig;
use crate::pipeline::BuildPipeline;

/// Token printed when no framework predicate matches.
const NOT_DETECTED: &str = "no";

/// `detect`: prints the framework's display name on stdout, exit 0; prints
/// the fixed not-detected token and exits 1 otherwise.
pub fn handle_detect(args: &DirArgs) -> i32 {
    let pipeline = match BuildPipeline::new(&args.build_dir(), StagingConfig::from_env()) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!("{err:#}");
            return 1;
        }
    };
    match pipeline.detect() {
        Some(kind) => {
            println!("{}", kind.name());
            0
        }
        None => {
            println!("{NOT_DETECTED}");
            1
        }
    }
}

/// `stage`: runs the full pipeline; a non-zero exit names the failed phase.
pub fn handle_stage(args: &DirArgs) -> i32 {
    let pipeline = match BuildPipeline::new(&args.build_dir(), StagingConfig::from_env()) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!("{err:#}");
            return 1;
        }
    };
    match pipeline.stage() {
        Ok(_) => 0,
        Err(err) => {
            error!("staging failed: {err:#}");
            1
        }
    }
}

/// `release`: prints the release metadata document on stdout.
pub fn handle_release(args: &DirArgs) -> i32 {
    let pipeline = match BuildPipeline::new(&args.build_dir(), StagingConfig::from_env()) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!("{err:#}");
            return 1;
        }
    };
    match pipeline.release().and_then(|release| release.to_yaml()) {
        Ok(yaml) => {
            print!("{yaml}");
            0
        }
        Err(err) => {
            error!("release failed: {err:#}");
            1
        }
    }
}
