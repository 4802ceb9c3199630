//! Shared helpers for integration tests: test doubles for the build engine and class runner

#![allow(dead_code)]

use async_trait::async_trait;
use javapack::build::{BuildEngine, BuildEnvironment, BuildMode};
use javapack::run::{ClassRunner, ExecutionContext};
use javapack::{JavapackError, Project, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const HELLO: &str = "public class Hello {\n    public static void main(String[] args) {\n        System.out.println(\"hello\");\n    }\n}\n";

pub fn javapack_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_javapack"))
}

/// What the engine saw while a build was running
#[derive(Debug, Clone)]
pub struct BuildRecord {
    pub project: Project,
    pub mode: BuildMode,
    pub descriptor: Option<String>,
    pub sources: Vec<(PathBuf, String)>,
}

/// Engine that snapshots the project tree instead of compiling it
#[derive(Default)]
pub struct RecordingEngine {
    pub builds: Mutex<Vec<BuildRecord>>,
    pub fail_with: Option<String>,
}

impl RecordingEngine {
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<BuildRecord> {
        self.builds.lock().unwrap().clone()
    }
}

fn collect_sources(root: &Path, dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_sources(root, &path, out);
        } else if path.extension().is_some_and(|e| e == "java") {
            let relative = path.strip_prefix(root).unwrap().to_path_buf();
            out.push((relative, fs::read_to_string(&path).unwrap()));
        }
    }
}

#[async_trait]
impl BuildEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    async fn build(&self, project: &Project, env: &BuildEnvironment, mode: BuildMode) -> Result<()> {
        env.report_line(&format!("[INFO] Building {}", project.coordinate));
        let mut sources = Vec::new();
        let source_root = project.directory.join("src/main/java");
        collect_sources(&source_root, &source_root, &mut sources);
        sources.sort();

        self.builds.lock().unwrap().push(BuildRecord {
            project: project.clone(),
            mode,
            descriptor: fs::read_to_string(&project.descriptor_path).ok(),
            sources,
        });

        if let Some(reason) = &self.fail_with {
            env.report_line("[ERROR] BUILD FAILURE");
            return Err(JavapackError::BuildFailure {
                project: project.coordinate.to_string(),
                reason: reason.clone(),
            });
        }

        fs::create_dir_all(project.classes_directory()).map_err(|e| JavapackError::io(project.classes_directory(), e))?;
        if mode.produces_archive() {
            let target = project.target_artifact_path();
            fs::write(&target, b"PK").map_err(|e| JavapackError::io(&target, e))?;
        }
        Ok(())
    }

    async fn classpath(
        &self,
        project: &Project,
        env: &BuildEnvironment,
        include_test_scope: bool,
    ) -> Result<String> {
        let resolved = std::env::join_paths(env.synthetic_paths_for(project).values())
            .unwrap()
            .to_string_lossy()
            .into_owned();
        javapack::build::maven::assemble_classpath(
            project,
            include_test_scope,
            &resolved,
            &env.synthetic_paths_for(project),
        )
    }
}

/// Runner that records the classes it was asked to run
#[derive(Default)]
pub struct RecordingRunner {
    pub runs: Mutex<Vec<(String, ExecutionContext)>>,
}

impl RecordingRunner {
    pub fn runs(&self) -> Vec<(String, ExecutionContext)> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassRunner for RecordingRunner {
    async fn run_class(&self, main_class: &str, context: &ExecutionContext) -> Result<()> {
        self.runs
            .lock()
            .unwrap()
            .push((main_class.to_string(), context.clone()));
        Ok(())
    }
}

/// Number of entries directly inside `dir`
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
