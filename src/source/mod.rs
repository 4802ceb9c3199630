//! Source unit handling
//!
//! A source unit is either a file on disk or in-memory text; [`identity`] derives the
//! fully-qualified name of the type it declares.

pub mod identity;

pub use identity::{byte_lines, identify, identify_file, identify_str, TypeIdentity, SOURCE_SUFFIX};

use std::path::PathBuf;

/// Where the source of a build comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUnit {
    /// An existing file: a `.java` source or a `pom.xml`
    File(PathBuf),
    /// Source text with no backing file
    Text(String),
}

impl SourceUnit {
    /// Picks the file when it exists, otherwise the text.
    ///
    /// Returns `None` when neither is usable.
    pub fn resolve(file: Option<PathBuf>, text: Option<String>) -> Option<Self> {
        match (file, text) {
            (Some(path), _) if path.exists() => Some(SourceUnit::File(path)),
            (_, Some(text)) => Some(SourceUnit::Text(text)),
            (Some(path), None) => Some(SourceUnit::File(path)),
            (None, None) => None,
        }
    }
}
