//! javastage - staging pipeline for Java-family web applications
//!
//! This library stages a pushed Java application for deployment on a
//! platform-as-a-service: it decides which framework the artifact carries
//! and which servlet container it needs, provisions a matching runtime
//! (JDK, container binaries, database drivers), and wires the platform's
//! auto-reconfiguration hooks into the app's deployment descriptor without
//! disturbing the app's own configuration.
//!
//! # Core Concepts
//!
//! - **Detection**: an ordered cascade of framework predicates (Play,
//!   Grails, Spring, Java Web, plain Java), memoized through hint files so
//!   later build phases agree with earlier ones even after the file tree
//!   has been rearranged
//! - **Container profiles**: static definitions of the supported servlet
//!   containers with an install/configure/repack lifecycle
//! - **Descriptor mutation**: idempotent, namespace-aware injection of the
//!   auto-reconfiguration entry points into `web.xml`
//!
//! # Project Structure
//!
//! - [`framework`]: detection cascade and framework kinds
//! - [`container`]: container registry, profiles and lifecycle
//! - [`descriptor`]: deployment-descriptor tree and mutation engine
//! - [`pipeline`]: the sequential staging pipeline
//! - [`fetch`]: layered artifact fetching (cache, blob store, download)

// Public modules
pub mod archive;
pub mod cli;
pub mod config;
pub mod container;
pub mod descriptor;
pub mod drivers;
pub mod error;
pub mod fetch;
pub mod framework;
pub mod fsutil;
pub mod hints;
pub mod jdk;
pub mod pipeline;
pub mod release;
pub mod sysprops;

// Re-export key types for convenient access
pub use config::{ConfigError, StagingConfig};
pub use container::{ContainerKind, ContainerProfile, ContainerRegistry};
pub use descriptor::{ConfigurationBundle, DescriptorMutator, DescriptorTree};
pub use error::StageError;
pub use fetch::{ArtifactFetcher, FetchError};
pub use framework::FrameworkKind;
pub use hints::{HintCategory, HintStore};
pub use pipeline::BuildPipeline;
pub use release::Release;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
