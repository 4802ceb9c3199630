//! Build engine abstraction
//!
//! The orchestrator never compiles or resolves anything itself; it hands a parsed [`Project`] to a
//! [`BuildEngine`] and consumes the artifacts and classpath the engine reports.

use super::environment::BuildEnvironment;
use crate::error::Result;
use crate::project::Project;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// What a build has to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// Classes only, no archive
    CompileOnly,
    /// The project's archive
    Package,
    /// The project's archive plus a sources archive
    PackageWithSources,
}

impl BuildMode {
    pub fn for_packaging(include_sources: bool) -> Self {
        if include_sources {
            BuildMode::PackageWithSources
        } else {
            BuildMode::Package
        }
    }

    pub fn produces_archive(&self) -> bool {
        !matches!(self, BuildMode::CompileOnly)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildMode::CompileOnly => "compile",
            BuildMode::Package => "package",
            BuildMode::PackageWithSources => "package-with-sources",
        };
        f.write_str(name)
    }
}

#[async_trait]
pub trait BuildEngine: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Builds `project`; output lines go through `env`
    async fn build(&self, project: &Project, env: &BuildEnvironment, mode: BuildMode) -> Result<()>;

    /// Classpath of a built project as a platform path list.
    ///
    /// The project's own output directories come first.
    async fn classpath(
        &self,
        project: &Project,
        env: &BuildEnvironment,
        include_test_scope: bool,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_packaging() {
        assert_eq!(BuildMode::for_packaging(false), BuildMode::Package);
        assert_eq!(BuildMode::for_packaging(true), BuildMode::PackageWithSources);
        assert!(!BuildMode::CompileOnly.produces_archive());
        assert!(BuildMode::PackageWithSources.produces_archive());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BuildMode::PackageWithSources.to_string(), "package-with-sources");
        assert_eq!(
            serde_json::to_string(&BuildMode::CompileOnly).unwrap(),
            "\"compile-only\""
        );
    }
}
