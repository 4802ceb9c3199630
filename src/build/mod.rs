//! Build orchestration: per-call environment, engine boundary and diagnostics

pub mod diagnostics;
pub mod engine;
pub mod environment;
pub mod maven;
pub mod orchestrator;

pub use diagnostics::{CapturedOutput, DiagnosticsSink};
pub use engine::{BuildEngine, BuildMode};
pub use environment::{BuildEnvironment, ScriptBindings};
pub use maven::MavenEngine;
pub use orchestrator::{BuildOrchestrator, Outcome, ProjectDescription};
