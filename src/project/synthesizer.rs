//! Turning a source unit into a buildable project
//!
//! Three cases are handled:
//!
//! - a `pom.xml` is parsed as is;
//! - a `.java` file inside `src/main/java` of a project with a descriptor builds in the context
//!   of that project;
//! - anything else is copied into a temporary workspace with a synthesized descriptor that
//!   declares the host classpath as dependencies.

use super::coordinate::Coordinate;
use super::dependencies::{ClasspathProvider, DependencyInferrer};
use super::descriptor::{descriptor_path_in, ProjectDescriptor};
use super::model::{Project, DESCRIPTOR_FILE_NAME};
use super::workspace::TemporaryWorkspace;
use crate::build::environment::BuildEnvironment;
use crate::error::{JavapackError, Result};
use crate::source::{byte_lines, identify_file, SourceUnit, TypeIdentity, SOURCE_SUFFIX};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::{debug, info};

/// Conventional source root, relative to the project directory
pub const SOURCE_ROOT: &str = "src/main/java";

/// A project ready to build, plus the resources it holds on to
#[derive(Debug)]
pub struct SynthesizedProject {
    pub project: Project,
    /// Main class established before the build, if any
    pub main_class: Option<String>,
    /// The descriptor that was synthesized, when the project did not exist before
    pub descriptor: Option<ProjectDescriptor>,
    /// Dropped after the build; removes the synthesized tree
    pub workspace: Option<TemporaryWorkspace>,
}

pub struct ProjectSynthesizer<'a> {
    providers: &'a [ClasspathProvider],
    workspace_parent: Option<PathBuf>,
}

impl<'a> ProjectSynthesizer<'a> {
    pub fn new(providers: &'a [ClasspathProvider]) -> Self {
        Self {
            providers,
            workspace_parent: None,
        }
    }

    /// Creates temporary workspaces under `parent` instead of the system temp dir
    pub fn with_workspace_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.workspace_parent = Some(parent.into());
        self
    }

    /// Produces a buildable project for `source`.
    ///
    /// `filename_hint` names the source when it has no file of its own; its stem is used as the
    /// class name when the text declares no public type.
    pub fn synthesize(
        &self,
        env: &mut BuildEnvironment,
        source: &SourceUnit,
        filename_hint: Option<&str>,
    ) -> Result<SynthesizedProject> {
        match source {
            SourceUnit::File(path) if path.exists() => self.from_file(env, path),
            SourceUnit::File(path) => Err(JavapackError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "source file does not exist"),
            )),
            SourceUnit::Text(text) => self.write_temporary_project(env, text.as_bytes(), filename_hint),
        }
    }

    fn from_file(&self, env: &mut BuildEnvironment, path: &Path) -> Result<SynthesizedProject> {
        if path.file_name().and_then(|n| n.to_str()) == Some(DESCRIPTOR_FILE_NAME) {
            debug!(path = %path.display(), "Building existing descriptor");
            return Ok(SynthesizedProject {
                project: env.parse_descriptor(path)?,
                main_class: None,
                descriptor: None,
                workspace: None,
            });
        }

        let identity = identify_file(path)?;
        let main_class = identity.fully_qualified_name();
        if let Some(project) = self.locate_enclosing_project(env, path, &identity)? {
            info!(
                project = %project.coordinate,
                "Building {} in the context of its enclosing project", main_class
            );
            return Ok(SynthesizedProject {
                project,
                main_class: Some(main_class),
                descriptor: None,
                workspace: None,
            });
        }

        let file = File::open(path).map_err(|e| JavapackError::io(path, e))?;
        let file_name = path.file_name().and_then(|n| n.to_str());
        let mut synthesized = self.write_temporary_project(env, BufReader::new(file), file_name)?;
        synthesized.main_class = Some(main_class);
        Ok(synthesized)
    }

    /// Validates that `path` agrees with `identity` and finds the descriptor of the project whose
    /// `src/main/java` contains it.
    fn locate_enclosing_project(
        &self,
        env: &mut BuildEnvironment,
        path: &Path,
        identity: &TypeIdentity,
    ) -> Result<Option<Project>> {
        let absolute = absolute_path(path)?;
        let path_str = absolute.to_string_lossy();
        let fully_qualified = identity.fully_qualified_name();

        let dotted = path_str.replace(MAIN_SEPARATOR, ".");
        if !dotted.ends_with(&format!(".{}{}", fully_qualified, SOURCE_SUFFIX)) {
            return Err(JavapackError::PathMismatch {
                class_name: fully_qualified,
                path: absolute,
            });
        }

        let candidate = &path_str[..path_str.len() - fully_qualified.len() - SOURCE_SUFFIX.len()];
        let normalized = candidate.replace(MAIN_SEPARATOR, "/");
        let source_root = format!("/{}/", SOURCE_ROOT);
        if !normalized.ends_with(&source_root) {
            return Ok(None);
        }

        let root = PathBuf::from(&candidate[..candidate.len() - source_root.len() + 1]);
        let descriptor = root.join(DESCRIPTOR_FILE_NAME);
        if !descriptor.exists() {
            debug!(root = %root.display(), "No descriptor in enclosing project root");
            return Ok(None);
        }
        env.parse_descriptor(&descriptor).map(Some)
    }

    fn write_temporary_project(
        &self,
        env: &mut BuildEnvironment,
        reader: impl BufRead,
        filename_hint: Option<&str>,
    ) -> Result<SynthesizedProject> {
        let workspace = match &self.workspace_parent {
            Some(parent) => TemporaryWorkspace::create_in(parent)?,
            None => TemporaryWorkspace::create()?,
        };

        let scratch = workspace.join(SOURCE_SUFFIX);
        copy_lines(reader, &scratch)?;

        let identity = self.identify_scratch(&scratch, filename_hint)?;
        let target = workspace.join(SOURCE_ROOT).join(identity.relative_source_path());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                JavapackError::workspace(parent, format!("could not make directory: {}", e))
            })?;
        }
        fs::rename(&scratch, &target).map_err(|e| {
            JavapackError::workspace(&target, format!("could not move {}: {}", scratch.display(), e))
        })?;

        let main_class = identity.fully_qualified_name();
        let dependencies = DependencyInferrer::new(self.providers).infer(env);
        let descriptor = ProjectDescriptor::new(
            Coordinate::synthesized(identity.simple_name.clone()),
            workspace.path(),
        )
        .with_main_class(main_class.clone())
        .with_dependencies(dependencies);

        let project = materialize_descriptor(env, &descriptor)?;
        info!(
            workspace = %workspace.path().display(),
            main_class = %main_class,
            dependencies = descriptor.dependencies.len(),
            "Synthesized temporary project"
        );

        Ok(SynthesizedProject {
            main_class: project.main_class.clone(),
            project,
            descriptor: Some(descriptor),
            workspace: Some(workspace),
        })
    }

    fn identify_scratch(&self, scratch: &Path, filename_hint: Option<&str>) -> Result<TypeIdentity> {
        let mut identity = identify_file(scratch)?;
        if identity.simple_name.is_empty() {
            let hint_stem = filename_hint
                .map(Path::new)
                .and_then(|hint| hint.file_name())
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(SOURCE_SUFFIX))
                .map(str::trim)
                .filter(|stem| !stem.is_empty());
            match hint_stem {
                Some(stem) => identity.simple_name = stem.to_string(),
                None => {
                    return Err(JavapackError::MalformedSource {
                        name: filename_hint.unwrap_or("<text>").to_string(),
                        reason: "no public type declared and no file name to fall back to"
                            .to_string(),
                    })
                }
            }
        }
        Ok(identity)
    }
}

/// Writes `descriptor` into its directory and parses the written bytes back.
///
/// When the directory is itself a `src/main/java` root whose project has no descriptor yet, the
/// descriptor goes to that project root instead.
pub fn materialize_descriptor(
    env: &mut BuildEnvironment,
    descriptor: &ProjectDescriptor,
) -> Result<Project> {
    let xml = descriptor.to_xml();
    let directory = &descriptor.directory;

    let normalized = directory.to_string_lossy().replace(MAIN_SEPARATOR, "/");
    if normalized.trim_end_matches('/').ends_with(&format!("/{}", SOURCE_ROOT)) {
        if let Some(root) = directory.ancestors().nth(3) {
            let pom = descriptor_path_in(root);
            if !pom.exists() {
                write_descriptor(&pom, &xml)?;
                return env.parse_descriptor(&pom);
            }
        }
    }

    let pom = descriptor_path_in(directory);
    write_descriptor(&pom, &xml)?;
    env.parse_descriptor_bytes(xml.as_bytes(), directory, &pom)
}

fn write_descriptor(path: &Path, xml: &str) -> Result<()> {
    fs::write(path, xml).map_err(|e| JavapackError::Serialization {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn copy_lines(reader: impl BufRead, destination: &Path) -> Result<()> {
    let file = File::create(destination).map_err(|e| JavapackError::workspace(destination, e))?;
    let mut out = BufWriter::new(file);
    for line in byte_lines(reader) {
        let line = line.map_err(|e| JavapackError::io(destination, e))?;
        out.write_all(&line)
            .and_then(|_| out.write_all(b"\n"))
            .map_err(|e| JavapackError::workspace(destination, e))?;
    }
    out.flush().map_err(|e| JavapackError::workspace(destination, e))
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| JavapackError::io(path, e))?;
    Ok(cwd.join(path))
}
