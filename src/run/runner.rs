//! Running the main class of a built project

use crate::build::engine::BuildEngine;
use crate::build::environment::BuildEnvironment;
use crate::error::{JavapackError, Result};
use crate::project::Project;
use async_trait::async_trait;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ARCHIVE_SUFFIX: &str = ".jar";

/// One element of a runtime classpath
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum ClasspathEntry {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl ClasspathEntry {
    /// Classifies `path` by name: anything ending in `.jar` is an archive
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.to_string_lossy().ends_with(ARCHIVE_SUFFIX) {
            ClasspathEntry::Archive(path)
        } else {
            ClasspathEntry::Directory(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::Directory(path) | ClasspathEntry::Archive(path) => path,
        }
    }
}

/// Everything a [`ClassRunner`] needs besides the class name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionContext {
    pub classpath: Vec<ClasspathEntry>,
    pub arguments: Vec<String>,
}

impl ExecutionContext {
    /// Splits a platform path list into classpath entries
    pub fn from_classpath(classpath: &str) -> Self {
        let classpath = std::env::split_paths(classpath)
            .filter(|p| !p.as_os_str().is_empty())
            .map(ClasspathEntry::from_path)
            .collect();
        Self {
            classpath,
            ..Self::default()
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    /// The classpath joined back into a platform path list
    pub fn classpath_string(&self) -> Result<OsString> {
        std::env::join_paths(self.classpath.iter().map(ClasspathEntry::path)).map_err(|e| {
            JavapackError::ExecutionFailed {
                main_class: String::new(),
                reason: format!("classpath entry cannot be joined: {}", e),
            }
        })
    }
}

/// Loads and runs a class with a given classpath
#[async_trait]
pub trait ClassRunner: Send + Sync {
    async fn run_class(&self, main_class: &str, context: &ExecutionContext) -> Result<()>;
}

/// Main class from the source scan, else from the project descriptor
pub fn resolve_main_class(explicit: Option<&str>, project: &Project) -> Result<String> {
    explicit
        .or_else(|| project.main_class())
        .map(str::to_string)
        .ok_or_else(|| JavapackError::NoMainClass(project.descriptor_path.display().to_string()))
}

/// Runs a built project through a [`ClassRunner`]
pub struct ArtifactRunner<'a> {
    engine: &'a dyn BuildEngine,
    runner: &'a dyn ClassRunner,
}

impl<'a> ArtifactRunner<'a> {
    pub fn new(engine: &'a dyn BuildEngine, runner: &'a dyn ClassRunner) -> Self {
        Self { engine, runner }
    }

    pub async fn run(
        &self,
        project: &Project,
        env: &BuildEnvironment,
        explicit_main_class: Option<&str>,
        arguments: &[String],
    ) -> Result<()> {
        let main_class = resolve_main_class(explicit_main_class, project)?;
        let classpath = self.engine.classpath(project, env, false).await?;
        let context = ExecutionContext::from_classpath(&classpath).with_arguments(arguments.to_vec());
        debug!(entries = context.classpath.len(), "Resolved runtime classpath");

        info!(main_class = %main_class, "Running main class");
        self.runner.run_class(&main_class, &context).await
    }
}
