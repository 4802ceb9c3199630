//! Execution of built projects

pub mod launcher;
pub mod runner;

pub use launcher::JavaLauncher;
pub use runner::{resolve_main_class, ArtifactRunner, ClassRunner, ClasspathEntry, ExecutionContext};
