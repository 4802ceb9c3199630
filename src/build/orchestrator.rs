//! Entry points: evaluate, compile, package and describe a source unit
//!
//! Every call owns its own [`BuildEnvironment`]. A temporary workspace, when one was needed, lives
//! exactly as long as the call. Failures follow one policy: with a diagnostics sink the error and
//! its causes are written to the sink and the call reports [`Outcome::ReportedFailure`]; without
//! one the error is returned.
//!
//! Workspaces that could not be removed when their call ended are retried when the orchestrator
//! is dropped, see [`purge_deferred`].

use super::diagnostics::DiagnosticsSink;
use super::engine::{BuildEngine, BuildMode};
use super::environment::{BuildEnvironment, ScriptBindings};
use crate::error::{JavapackError, Result};
use crate::project::{purge_deferred, ClasspathProvider, Project, ProjectSynthesizer, SynthesizedProject};
use crate::run::{ArtifactRunner, ClassRunner};
use crate::source::SourceUnit;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a call whose failures may have been reported to a sink instead of returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Succeeded(T),
    /// The failure was written to the diagnostics sink
    ReportedFailure,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Succeeded(value) => Some(value),
            Outcome::ReportedFailure => None,
        }
    }
}

/// A project descriptor as it would be handed to the build engine, without building
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDescription {
    pub project: Project,
    pub main_class: Option<String>,
    /// Whether the project only exists for the duration of the call
    pub synthesized: bool,
    /// Descriptor XML
    pub descriptor: String,
}

pub struct BuildOrchestrator {
    engine: Arc<dyn BuildEngine>,
    runner: Arc<dyn ClassRunner>,
    providers: Vec<ClasspathProvider>,
    defaults: ScriptBindings,
    workspace_parent: Option<PathBuf>,
}

impl BuildOrchestrator {
    pub fn new(engine: Arc<dyn BuildEngine>, runner: Arc<dyn ClassRunner>) -> Self {
        Self {
            engine,
            runner,
            providers: Vec::new(),
            defaults: ScriptBindings::new(),
            workspace_parent: None,
        }
    }

    /// Host classpath, most specific provider first
    pub fn with_providers(mut self, providers: Vec<ClasspathProvider>) -> Self {
        self.providers = providers;
        self
    }

    /// Bindings every call starts from; `evaluate` bindings override them
    pub fn with_default_bindings(mut self, defaults: ScriptBindings) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_workspace_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.workspace_parent = Some(parent.into());
        self
    }

    fn synthesizer(&self) -> ProjectSynthesizer<'_> {
        let synthesizer = ProjectSynthesizer::new(&self.providers);
        match &self.workspace_parent {
            Some(parent) => synthesizer.with_workspace_parent(parent.clone()),
            None => synthesizer,
        }
    }

    fn environment(&self, overrides: Option<&ScriptBindings>, sink: Option<DiagnosticsSink>) -> BuildEnvironment {
        let mut bindings = self.defaults.clone();
        if let Some(overrides) = overrides {
            for (key, value) in overrides.iter() {
                bindings.set(key, value);
            }
        }
        BuildEnvironment::from_bindings(&bindings, sink)
    }

    /// Builds the source and runs its main class.
    ///
    /// `filename_hint` names the script; when it points at an existing file that file is built
    /// instead of `source_text`.
    pub async fn evaluate(
        &self,
        source_text: &str,
        filename_hint: Option<&str>,
        bindings: &ScriptBindings,
        arguments: &[String],
        sink: Option<DiagnosticsSink>,
    ) -> Result<Outcome> {
        let mut env = self.environment(Some(bindings), sink.clone());
        let source = SourceUnit::resolve(filename_hint.map(PathBuf::from), Some(source_text.to_string()))
            .unwrap_or_else(|| SourceUnit::Text(source_text.to_string()));
        let result = self.run_source(&mut env, &source, filename_hint, arguments).await;
        settle(result, sink.as_ref())
    }

    async fn run_source(
        &self,
        env: &mut BuildEnvironment,
        source: &SourceUnit,
        filename_hint: Option<&str>,
        arguments: &[String],
    ) -> Result<()> {
        let synthesized = self.synthesizer().synthesize(env, source, filename_hint)?;
        self.build(&synthesized, env, BuildMode::Package).await?;
        ArtifactRunner::new(self.engine.as_ref(), self.runner.as_ref())
            .run(
                &synthesized.project,
                env,
                synthesized.main_class.as_deref(),
                arguments,
            )
            .await
    }

    /// Compiles a `.java` file or a `pom.xml` project
    pub async fn compile(&self, file: &Path, sink: Option<DiagnosticsSink>) -> Result<Outcome> {
        let mut env = self.environment(None, sink.clone());
        let result = self.compile_file(&mut env, file).await;
        settle(result, sink.as_ref())
    }

    /// Packages a `.java` file or a `pom.xml` project into an archive.
    ///
    /// The archive is copied to `output` unless that is where the engine put it. Returns the
    /// final location of the archive, or `None` when no `output` was given for a synthesized
    /// project and the archive went away with its workspace.
    pub async fn package_to_archive(
        &self,
        file: &Path,
        include_sources: bool,
        output: Option<&Path>,
        sink: Option<DiagnosticsSink>,
    ) -> Result<Outcome<Option<PathBuf>>> {
        let mut env = self.environment(None, sink.clone());
        let result = self.package_file(&mut env, file, include_sources, output).await;
        settle(result, sink.as_ref())
    }

    async fn compile_file(&self, env: &mut BuildEnvironment, file: &Path) -> Result<()> {
        let synthesized = self.synthesize_file(env, file)?;
        self.build(&synthesized, env, BuildMode::CompileOnly).await
    }

    async fn package_file(
        &self,
        env: &mut BuildEnvironment,
        file: &Path,
        include_sources: bool,
        output: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let synthesized = self.synthesize_file(env, file)?;
        self.build(&synthesized, env, BuildMode::for_packaging(include_sources))
            .await?;

        let target = synthesized.project.target_artifact_path();
        match output {
            Some(output) if output != target => {
                copy_artifact(&target, output)?;
                Ok(Some(output.to_path_buf()))
            }
            Some(_) => Ok(Some(target)),
            None if synthesized.workspace.is_some() => {
                warn!(
                    artifact = %target.display(),
                    "No output path given; the archive is removed with the temporary workspace"
                );
                Ok(None)
            }
            None => Ok(Some(target)),
        }
    }

    /// Locates or synthesizes the project for a file or text without building it
    pub async fn describe(
        &self,
        source: &SourceUnit,
        filename_hint: Option<&str>,
    ) -> Result<ProjectDescription> {
        let mut env = self.environment(None, None);
        let synthesized = self.synthesizer().synthesize(&mut env, source, filename_hint)?;
        let descriptor = match &synthesized.descriptor {
            Some(descriptor) => descriptor.to_xml(),
            None => fs::read_to_string(&synthesized.project.descriptor_path).map_err(|e| {
                JavapackError::io(&synthesized.project.descriptor_path, e)
            })?,
        };
        let description = ProjectDescription {
            main_class: synthesized
                .main_class
                .clone()
                .or_else(|| synthesized.project.main_class.clone()),
            synthesized: synthesized.workspace.is_some(),
            project: synthesized.project.clone(),
            descriptor,
        };
        Ok(description)
    }

    fn synthesize_file(&self, env: &mut BuildEnvironment, file: &Path) -> Result<SynthesizedProject> {
        self.synthesizer()
            .synthesize(env, &SourceUnit::File(file.to_path_buf()), file.to_str())
    }

    async fn build(&self, synthesized: &SynthesizedProject, env: &BuildEnvironment, mode: BuildMode) -> Result<()> {
        info!(
            project = %synthesized.project.coordinate,
            engine = self.engine.name(),
            mode = %mode,
            "Building project"
        );
        self.engine.build(&synthesized.project, env, mode).await?;
        debug!(project = %synthesized.project.coordinate, "Build finished");
        Ok(())
    }
}

impl Drop for BuildOrchestrator {
    fn drop(&mut self) {
        let leftover = purge_deferred();
        if !leftover.is_empty() {
            warn!(count = leftover.len(), "Temporary workspaces could not be removed: {:?}", leftover);
        }
    }
}

/// Applies the sink-or-propagate failure policy and flushes the sink
fn settle<T>(result: Result<T>, sink: Option<&DiagnosticsSink>) -> Result<Outcome<T>> {
    match (result, sink) {
        (Ok(value), sink) => {
            if let Some(sink) = sink {
                sink.flush();
            }
            Ok(Outcome::Succeeded(value))
        }
        (Err(e), Some(sink)) => {
            warn!(error = %e, "Build failed; reported to diagnostics sink");
            sink.report(&e);
            Ok(Outcome::ReportedFailure)
        }
        (Err(e), None) => Err(e),
    }
}

fn copy_artifact(target: &Path, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| JavapackError::io(parent, e))?;
    }
    fs::copy(target, output).map_err(|e| JavapackError::io(target, e))?;
    info!(from = %target.display(), to = %output.display(), "Copied archive");
    Ok(())
}
