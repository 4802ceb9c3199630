use serde::{Deserialize, Serialize};
use std::fmt;

/// Group id given to every synthesized project and dependency
pub const DEFAULT_GROUP_ID: &str = "org.javapack.synthetic";

/// Version given to synthesized projects
pub const DEFAULT_VERSION: &str = "1.0.0-SNAPSHOT";

/// Version given to dependencies inferred from the host classpath
pub const DEPENDENCY_VERSION: &str = "1.0.0";

/// A (groupId, artifactId, version) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Coordinate of a project synthesized around a loose source file
    pub fn synthesized(artifact_id: impl Into<String>) -> Self {
        Self::new(DEFAULT_GROUP_ID, artifact_id, DEFAULT_VERSION)
    }

    /// Coordinate of a dependency inferred from a local classpath entry
    pub fn inferred(artifact_id: impl Into<String>) -> Self {
        Self::new(DEFAULT_GROUP_ID, artifact_id, DEPENDENCY_VERSION)
    }

    /// The `(groupId, artifactId)` pair that must be unique within a dependency set
    pub fn key(&self) -> (&str, &str) {
        (&self.group_id, &self.artifact_id)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let coordinate = Coordinate::new("g", "a", "1");
        assert_eq!(coordinate.to_string(), "g:a:1");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            Coordinate::synthesized("Hello"),
            Coordinate::new(DEFAULT_GROUP_ID, "Hello", DEFAULT_VERSION)
        );
        assert_eq!(Coordinate::inferred("lib").version, "1.0.0");
    }
}
