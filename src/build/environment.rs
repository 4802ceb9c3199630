//! Per-build configuration and the set of projects known during one build

use super::diagnostics::DiagnosticsSink;
use crate::error::{JavapackError, Result};
use crate::project::{Coordinate, Project};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Named options handed in by the host, e.g. `verbose=true`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptBindings {
    values: BTreeMap<String, String>,
}

impl ScriptBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// A flag is on only when its value is exactly `true`
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// Parses `KEY=VALUE`; a bare `KEY` means `KEY=true`
    pub fn parse_assignment(assignment: &str) -> (String, String) {
        match assignment.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.to_string()),
            None => (assignment.trim().to_string(), "true".to_string()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// State owned by a single build invocation. Never shared between builds.
#[derive(Debug)]
pub struct BuildEnvironment {
    verbose: bool,
    debug: bool,
    diagnostics: Option<DiagnosticsSink>,
    /// (groupId, artifactId) of every descriptor parsed so far
    parsed: BTreeMap<(String, String), PathBuf>,
    /// Local artifacts standing in for already-resolved dependencies
    synthetic: BTreeMap<Coordinate, PathBuf>,
}

impl BuildEnvironment {
    pub fn new(verbose: bool, debug: bool, diagnostics: Option<DiagnosticsSink>) -> Self {
        Self {
            verbose,
            debug,
            diagnostics,
            parsed: BTreeMap::new(),
            synthetic: BTreeMap::new(),
        }
    }

    pub fn from_bindings(bindings: &ScriptBindings, diagnostics: Option<DiagnosticsSink>) -> Self {
        Self::new(bindings.flag("verbose"), bindings.flag("debug"), diagnostics)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn diagnostics(&self) -> Option<&DiagnosticsSink> {
        self.diagnostics.as_ref()
    }

    /// Forwards one line of build output to the sink, or to the log without one
    pub fn report_line(&self, line: &str) {
        match &self.diagnostics {
            Some(sink) => sink.line(line),
            None => debug!(target: "javapack::build_output", "{}", line),
        }
    }

    pub fn contains_project(&self, group_id: &str, artifact_id: &str) -> bool {
        let key = (group_id.to_string(), artifact_id.to_string());
        self.parsed.contains_key(&key)
            || self
                .synthetic
                .keys()
                .any(|c| c.group_id == group_id && c.artifact_id == artifact_id)
    }

    /// Declares `coordinate` as already resolved, backed by the local `path`
    pub fn register_synthetic_descriptor(&mut self, path: &Path, coordinate: &Coordinate) {
        trace!(coordinate = %coordinate, path = %path.display(), "Registering synthetic dependency");
        self.synthetic.insert(coordinate.clone(), path.to_path_buf());
    }

    pub fn synthetic_artifact(&self, coordinate: &Coordinate) -> Option<&Path> {
        self.synthetic.get(coordinate).map(PathBuf::as_path)
    }

    /// Local paths of the synthetic dependencies `project` declares
    pub fn synthetic_paths_for(&self, project: &Project) -> BTreeMap<Coordinate, PathBuf> {
        project
            .dependencies
            .iter()
            .filter_map(|d| {
                self.synthetic
                    .get(&d.coordinate)
                    .map(|path| (d.coordinate.clone(), path.clone()))
            })
            .collect()
    }

    /// Parses the descriptor file at `path`
    pub fn parse_descriptor(&mut self, path: &Path) -> Result<Project> {
        let xml = fs::read_to_string(path).map_err(|e| JavapackError::DescriptorParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.parse_descriptor_bytes(xml.as_bytes(), &directory, path)
    }

    /// Parses descriptor bytes whose relative paths resolve against `directory`
    pub fn parse_descriptor_bytes(
        &mut self,
        bytes: &[u8],
        directory: &Path,
        descriptor_path: &Path,
    ) -> Result<Project> {
        let xml = std::str::from_utf8(bytes).map_err(|e| JavapackError::DescriptorParse {
            path: descriptor_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let project = Project::from_xml(xml, directory, descriptor_path)?;
        debug!(coordinate = %project.coordinate, "Parsed project descriptor");
        self.parsed.insert(
            (
                project.coordinate.group_id.clone(),
                project.coordinate.artifact_id.clone(),
            ),
            descriptor_path.to_path_buf(),
        );
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_flags() {
        let mut bindings = ScriptBindings::new();
        bindings.set("verbose", "true").set("debug", "yes");
        assert!(bindings.flag("verbose"));
        assert!(!bindings.flag("debug"));
        assert!(!bindings.flag("missing"));

        let env = BuildEnvironment::from_bindings(&bindings, None);
        assert!(env.is_verbose());
        assert!(!env.is_debug());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            ScriptBindings::parse_assignment("verbose=true"),
            ("verbose".to_string(), "true".to_string())
        );
        assert_eq!(
            ScriptBindings::parse_assignment("debug"),
            ("debug".to_string(), "true".to_string())
        );
        assert_eq!(
            ScriptBindings::parse_assignment("x=a=b"),
            ("x".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn test_synthetic_registration_is_known() {
        let mut env = BuildEnvironment::new(false, false, None);
        let coordinate = Coordinate::inferred("lib");
        assert!(!env.contains_project(&coordinate.group_id, "lib"));
        env.register_synthetic_descriptor(Path::new("/x/lib.jar"), &coordinate);
        assert!(env.contains_project(&coordinate.group_id, "lib"));
        assert_eq!(env.synthetic_artifact(&coordinate), Some(Path::new("/x/lib.jar")));
    }

    #[test]
    fn test_environments_do_not_share_state() {
        let mut first = BuildEnvironment::new(false, false, None);
        first.register_synthetic_descriptor(Path::new("/x/lib.jar"), &Coordinate::inferred("lib"));
        let second = BuildEnvironment::new(false, false, None);
        assert!(!second.contains_project(crate::project::DEFAULT_GROUP_ID, "lib"));
    }

    #[test]
    fn test_parse_descriptor_registers_project() {
        let dir = tempfile::TempDir::new().unwrap();
        let pom = dir.path().join("pom.xml");
        fs::write(
            &pom,
            "<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>",
        )
        .unwrap();

        let mut env = BuildEnvironment::new(false, false, None);
        let project = env.parse_descriptor(&pom).unwrap();
        assert_eq!(project.directory, dir.path());
        assert!(env.contains_project("g", "a"));
    }

    #[test]
    fn test_missing_descriptor_is_parse_error() {
        let mut env = BuildEnvironment::new(false, false, None);
        let err = env.parse_descriptor(Path::new("/nonexistent/pom.xml")).unwrap_err();
        assert!(matches!(err, JavapackError::DescriptorParse { .. }));
    }

    #[test]
    fn test_report_line_goes_to_sink() {
        let (sink, output) = DiagnosticsSink::capture();
        let env = BuildEnvironment::new(false, false, Some(sink));
        env.report_line("[INFO] BUILD SUCCESS");
        assert_eq!(output.lines(), vec!["[INFO] BUILD SUCCESS"]);
    }
}
