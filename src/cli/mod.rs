//! Command-line interface.

pub mod handlers;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Staging pipeline for Java-family web applications on a PaaS
#[derive(Parser, Debug)]
#[command(
    name = "javastage",
    about = "Stages Java, Java Web, Spring, Grails and Play applications for deployment",
    version,
    long_about = "javastage inspects a pushed build directory, decides which framework \
                  and servlet container the application needs, provisions a matching \
                  runtime and wires the platform's auto-reconfiguration hooks into the \
                  app's deployment descriptor."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect the application framework",
        long_about = "Prints the detected framework's name and exits 0, or prints 'no' \
                      and exits 1 when no framework applies."
    )]
    Detect(DirArgs),

    #[command(about = "Stage the application for deployment")]
    Stage(DirArgs),

    #[command(about = "Print the release metadata for a staged application")]
    Release(DirArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DirArgs {
    #[arg(
        value_name = "BUILD_DIR",
        help = "Path to the build directory (defaults to the current directory)"
    )]
    pub build_dir: Option<PathBuf>,
}

impl DirArgs {
    pub fn build_dir(&self) -> PathBuf {
        self.build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
