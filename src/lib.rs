//! javapack - build, package and run single-file Java programs through Maven
//!
//! A loose `.java` file has no project around it. javapack finds the type it declares, lays out
//! a minimal Maven project for it in a temporary workspace, declares everything on the host
//! classpath as dependencies, and hands the result to a build engine. Files that already live in
//! `src/main/java` of a project with a `pom.xml`, and `pom.xml` files themselves, are built in
//! place.
//!
//! # Example Usage
//!
//! ```no_run
//! use javapack::{BuildOrchestrator, JavaLauncher, MavenEngine, ScriptBindings};
//! use std::sync::Arc;
//!
//! # async fn example() -> javapack::Result<()> {
//! let orchestrator = BuildOrchestrator::new(
//!     Arc::new(MavenEngine::default()),
//!     Arc::new(JavaLauncher::default()),
//! );
//! let source = "public class Hello { public static void main(String[] a) { } }";
//! orchestrator
//!     .evaluate(source, None, &ScriptBindings::new(), &[], None)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`source`]: identifying the type a source file declares
//! - [`project`]: coordinates, descriptors, dependency inference and project synthesis
//! - [`build`]: the build engine boundary and the orchestrator driving it
//! - [`run`]: running the main class of a built project

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod project;
pub mod run;
pub mod source;
pub mod util;

pub use build::{
    BuildEngine, BuildEnvironment, BuildMode, BuildOrchestrator, DiagnosticsSink, MavenEngine, Outcome,
    ScriptBindings,
};
pub use config::{ConfigError, JavapackConfig};
pub use error::{JavapackError, Result};
pub use project::{ClasspathProvider, Coordinate, Project, ProjectDescriptor, TemporaryWorkspace};
pub use run::{ClassRunner, ClasspathEntry, ExecutionContext, JavaLauncher};
pub use source::{SourceUnit, TypeIdentity};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
