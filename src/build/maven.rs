//! Build engine backed by an external `mvn` executable

use super::engine::{BuildEngine, BuildMode};
use super::environment::BuildEnvironment;
use crate::error::{JavapackError, Result};
use crate::project::{Coordinate, Project, ProjectDescriptor};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Descriptor written beside the real one when synthetic dependencies must be declared
pub const EFFECTIVE_DESCRIPTOR_NAME: &str = ".javapack-effective.xml";

const CLASSPATH_OUTPUT_NAME: &str = "javapack-classpath.txt";

/// Lines of engine output kept for the failure message
const FAILURE_CONTEXT_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct MavenEngine {
    executable: PathBuf,
    offline: bool,
}

impl Default for MavenEngine {
    fn default() -> Self {
        Self::new("mvn")
    }
}

impl MavenEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            offline: false,
        }
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn goals(mode: BuildMode) -> &'static [&'static str] {
        match mode {
            BuildMode::CompileOnly => &["compile"],
            BuildMode::Package => &["package"],
            BuildMode::PackageWithSources => &["package", "source:jar-no-fork"],
        }
    }

    /// Full argument list for running `goals` against `descriptor`
    pub fn command_args(&self, descriptor: &Path, env: &BuildEnvironment, goals: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-B".into()];
        if env.is_debug() {
            args.push("-X".into());
        } else if !env.is_verbose() {
            args.push("-q".into());
        }
        if self.offline {
            args.push("-o".into());
        }
        args.push("-DskipTests".into());
        args.push("-f".into());
        args.push(descriptor.as_os_str().to_owned());
        args.extend(goals.iter().map(OsString::from));
        args
    }

    /// Picks the descriptor to hand to `mvn`.
    ///
    /// Projects depending on synthetic coordinates get an effective descriptor declaring those
    /// as `system`-scoped artifacts, so nothing is fetched from a repository.
    pub fn effective_descriptor(&self, project: &Project, env: &BuildEnvironment) -> Result<PathBuf> {
        let mut system_paths = env.synthetic_paths_for(project);
        if system_paths.is_empty() {
            return Ok(project.descriptor_path.clone());
        }

        let missing: Vec<Coordinate> = system_paths
            .iter()
            .filter(|(_, path)| !path.exists())
            .map(|(coordinate, _)| coordinate.clone())
            .collect();
        let mut descriptor = ProjectDescriptor::from_project(project);
        for coordinate in &missing {
            warn!(dependency = %coordinate, "Dropping synthetic dependency without a local artifact");
            system_paths.remove(coordinate);
            descriptor.dependencies.retain(|d| d != coordinate);
        }

        let path = project.directory.join(EFFECTIVE_DESCRIPTOR_NAME);
        fs::write(&path, descriptor.to_xml_with_system_paths(&system_paths)).map_err(|e| {
            JavapackError::Serialization {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        debug!(path = %path.display(), dependencies = system_paths.len(), "Wrote effective descriptor");
        Ok(path)
    }

    async fn run(&self, project: &Project, env: &BuildEnvironment, goals: &[String]) -> Result<()> {
        let descriptor = self.effective_descriptor(project, env)?;
        let args = self.command_args(&descriptor, env, goals);
        let label = project.coordinate.to_string();
        let failure = |reason: String| JavapackError::BuildFailure {
            project: label.clone(),
            reason,
        };

        info!(project = %label, goals = %goals.join(" "), "Running {}", self.executable.display());
        let mut child = Command::new(&self.executable)
            .args(&args)
            .current_dir(&project.directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failure(format!("could not start {}: {}", self.executable.display(), e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| failure("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| failure("stderr not captured".to_string()))?;
        let mut stdout_lines = BufReader::new(stdout).lines();
        let mut stderr_lines = BufReader::new(stderr).lines();
        let mut stdout_open = true;
        let mut stderr_open = true;
        let mut recent: VecDeque<String> = VecDeque::with_capacity(FAILURE_CONTEXT_LINES);

        let mut record = |line: String| {
            env.report_line(&line);
            if recent.len() == FAILURE_CONTEXT_LINES {
                recent.pop_front();
            }
            recent.push_back(line);
        };

        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_lines.next_line(), if stdout_open => match line {
                    Ok(Some(line)) => record(line),
                    Ok(None) => stdout_open = false,
                    Err(e) => {
                        warn!(error = %e, "Error reading build stdout");
                        stdout_open = false;
                    }
                },
                line = stderr_lines.next_line(), if stderr_open => match line {
                    Ok(Some(line)) => record(line),
                    Ok(None) => stderr_open = false,
                    Err(e) => {
                        warn!(error = %e, "Error reading build stderr");
                        stderr_open = false;
                    }
                },
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| failure(format!("could not wait for {}: {}", self.executable.display(), e)))?;
        if status.success() {
            debug!(project = %label, "Build engine finished");
            return Ok(());
        }

        let mut reason = match status.code() {
            Some(code) => format!("{} exited with status {}", self.executable.display(), code),
            None => format!("{} was terminated by a signal", self.executable.display()),
        };
        if !recent.is_empty() {
            reason.push('\n');
            reason.push_str(&Vec::from(recent).join("\n"));
        }
        Err(failure(reason))
    }
}

/// Joins the project's output directories, the resolved classpath and the local artifacts of its
/// synthetic dependencies, without duplicates.
pub fn assemble_classpath(
    project: &Project,
    include_test_scope: bool,
    resolved: &str,
    synthetic: &BTreeMap<Coordinate, PathBuf>,
) -> Result<String> {
    let mut entries = vec![project.classes_directory()];
    if include_test_scope {
        entries.push(project.test_classes_directory());
    }
    for entry in std::env::split_paths(resolved.trim()) {
        if !entry.as_os_str().is_empty() && !entries.contains(&entry) {
            entries.push(entry);
        }
    }
    for path in synthetic.values() {
        if !entries.contains(path) {
            entries.push(path.clone());
        }
    }

    let joined = std::env::join_paths(&entries).map_err(|e| JavapackError::BuildFailure {
        project: project.coordinate.to_string(),
        reason: format!("classpath entry cannot be joined: {}", e),
    })?;
    Ok(joined.to_string_lossy().into_owned())
}

#[async_trait]
impl BuildEngine for MavenEngine {
    fn name(&self) -> &str {
        "maven"
    }

    async fn build(&self, project: &Project, env: &BuildEnvironment, mode: BuildMode) -> Result<()> {
        let goals: Vec<String> = Self::goals(mode).iter().map(|g| g.to_string()).collect();
        self.run(project, env, &goals).await
    }

    async fn classpath(
        &self,
        project: &Project,
        env: &BuildEnvironment,
        include_test_scope: bool,
    ) -> Result<String> {
        let target = project.target_directory();
        fs::create_dir_all(&target).map_err(|e| JavapackError::io(&target, e))?;
        let output = target.join(CLASSPATH_OUTPUT_NAME);
        let scope = if include_test_scope { "test" } else { "runtime" };

        let goals = vec![
            "dependency:build-classpath".to_string(),
            format!("-Dmdep.outputFile={}", output.display()),
            format!("-Dmdep.includeScope={}", scope),
        ];
        self.run(project, env, &goals).await?;

        let resolved = match fs::read_to_string(&output) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(JavapackError::io(&output, e)),
        };
        assemble_classpath(project, include_test_scope, &resolved, &env.synthetic_paths_for(project))
    }
}
