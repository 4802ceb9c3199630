//! Error taxonomy for project synthesis, building and running

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while synthesizing, building or running a project
#[derive(Debug, Error)]
pub enum JavapackError {
    /// The source unit does not look like a single compilable `.java` file
    #[error("Malformed source {name}: {reason}")]
    MalformedSource { name: String, reason: String },

    /// The file location contradicts its declared package/class
    #[error("Class {class_name} in invalid directory: {path}")]
    PathMismatch { class_name: String, path: PathBuf },

    /// Temporary directory or file manipulation failed
    #[error("Workspace creation failed for {path}: {reason}")]
    WorkspaceCreation { path: PathBuf, reason: String },

    /// Neither the source, the descriptor nor the built project names a main class
    #[error("No main class found for {0}")]
    NoMainClass(String),

    /// A project descriptor could not be parsed
    #[error("Failed to parse descriptor {path}: {reason}")]
    DescriptorParse { path: PathBuf, reason: String },

    /// A project descriptor could not be serialized or written
    #[error("Failed to write descriptor {path}: {reason}")]
    Serialization { path: PathBuf, reason: String },

    /// The build engine reported a failure
    #[error("Build failed for {project}: {reason}")]
    BuildFailure { project: String, reason: String },

    /// The launched program exited unsuccessfully
    #[error("Execution of {main_class} failed: {reason}")]
    ExecutionFailed { main_class: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl JavapackError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        JavapackError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn workspace(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        JavapackError::WorkspaceCreation {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JavapackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_mismatch_message() {
        let err = JavapackError::PathMismatch {
            class_name: "a.b.Foo".to_string(),
            path: PathBuf::from("/tmp/x/Foo.java"),
        };
        assert_eq!(
            err.to_string(),
            "Class a.b.Foo in invalid directory: /tmp/x/Foo.java"
        );
    }

    #[test]
    fn test_build_failure_names_project() {
        let err = JavapackError::BuildFailure {
            project: "Hello".to_string(),
            reason: "exit status 1".to_string(),
        };
        assert!(err.to_string().contains("Hello"));
    }

    #[test]
    fn test_io_helper_keeps_source() {
        let err = JavapackError::io("/nope", io::Error::new(io::ErrorKind::NotFound, "gone"));
        match err {
            JavapackError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/nope"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Io error"),
        }
    }
}
