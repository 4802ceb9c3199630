//! Parsed form of a Maven project descriptor

use super::coordinate::Coordinate;
use crate::error::{JavapackError, Result};
use roxmltree::{Document, Node};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of a project descriptor
pub const DESCRIPTOR_FILE_NAME: &str = "pom.xml";

/// Plugin whose manifest configuration carries the main class
pub const PACKAGING_PLUGIN: &str = "maven-jar-plugin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDependency {
    pub coordinate: Coordinate,
    pub scope: Option<String>,
}

/// A project as understood by the build engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub coordinate: Coordinate,
    pub packaging: String,
    pub final_name: Option<String>,
    pub main_class: Option<String>,
    pub dependencies: Vec<ProjectDependency>,
    /// Base directory the descriptor's relative paths resolve against
    pub directory: PathBuf,
    pub descriptor_path: PathBuf,
}

impl Project {
    /// Parses descriptor XML whose base directory is `directory`
    pub fn from_xml(xml: &str, directory: &Path, descriptor_path: &Path) -> Result<Self> {
        let parse_error = |reason: String| JavapackError::DescriptorParse {
            path: descriptor_path.to_path_buf(),
            reason,
        };

        let doc = Document::parse(xml).map_err(|e| parse_error(e.to_string()))?;
        let root = doc.root_element();
        if !root.has_tag_name("project") {
            return Err(parse_error(format!(
                "root element is <{}>, expected <project>",
                root.tag_name().name()
            )));
        }

        let parent = child(root, "parent");
        let inherited = |name: &str| child_text(root, name).or_else(|| parent.and_then(|p| child_text(p, name)));

        let artifact_id =
            child_text(root, "artifactId").ok_or_else(|| parse_error("missing artifactId".to_string()))?;
        let group_id = inherited("groupId").ok_or_else(|| parse_error("missing groupId".to_string()))?;
        let version = inherited("version").ok_or_else(|| parse_error("missing version".to_string()))?;

        let build = child(root, "build");
        let final_name = build.and_then(|b| child_text(b, "finalName"));
        let main_class = build.and_then(manifest_main_class);

        let mut dependencies = Vec::new();
        if let Some(deps) = child(root, "dependencies") {
            for dep in deps.children().filter(|n| n.has_tag_name("dependency")) {
                let coordinate = Coordinate::new(
                    child_text(dep, "groupId").ok_or_else(|| parse_error("dependency without groupId".to_string()))?,
                    child_text(dep, "artifactId")
                        .ok_or_else(|| parse_error("dependency without artifactId".to_string()))?,
                    child_text(dep, "version").unwrap_or_default(),
                );
                dependencies.push(ProjectDependency {
                    coordinate,
                    scope: child_text(dep, "scope"),
                });
            }
        }

        Ok(Self {
            coordinate: Coordinate::new(group_id, artifact_id, version),
            packaging: child_text(root, "packaging").unwrap_or_else(|| "jar".to_string()),
            final_name,
            main_class,
            dependencies,
            directory: directory.to_path_buf(),
            descriptor_path: descriptor_path.to_path_buf(),
        })
    }

    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    pub fn dependency_coordinates(&self) -> Vec<Coordinate> {
        self.dependencies.iter().map(|d| d.coordinate.clone()).collect()
    }

    pub fn target_directory(&self) -> PathBuf {
        self.directory.join("target")
    }

    pub fn classes_directory(&self) -> PathBuf {
        self.target_directory().join("classes")
    }

    pub fn test_classes_directory(&self) -> PathBuf {
        self.target_directory().join("test-classes")
    }

    fn artifact_base_name(&self) -> String {
        self.final_name.clone().unwrap_or_else(|| {
            format!("{}-{}", self.coordinate.artifact_id, self.coordinate.version)
        })
    }

    /// Path of the archive a package build produces
    pub fn target_artifact_path(&self) -> PathBuf {
        let extension = match self.packaging.as_str() {
            "war" => "war",
            "ear" => "ear",
            _ => "jar",
        };
        self.target_directory()
            .join(format!("{}.{}", self.artifact_base_name(), extension))
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn manifest_main_class(build: Node) -> Option<String> {
    let plugins = child(build, "plugins")?;
    let mut fallback = None;
    for plugin in plugins.children().filter(|n| n.has_tag_name("plugin")) {
        let main_class = child(plugin, "configuration")
            .and_then(|c| child(c, "archive"))
            .and_then(|a| child(a, "manifest"))
            .and_then(|m| child_text(m, "mainClass"));
        if main_class.is_none() {
            continue;
        }
        if child_text(plugin, "artifactId").as_deref() == Some(PACKAGING_PLUGIN) {
            return main_class;
        }
        fallback = fallback.or(main_class);
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<Project> {
        Project::from_xml(xml, Path::new("/work/app"), Path::new("/work/app/pom.xml"))
    }

    #[test]
    fn test_parse_simple_project() {
        let project = parse(
            r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
                <groupId>com.example</groupId>
                <artifactId>my-app</artifactId>
                <version>1.0.0</version>
                <dependencies>
                    <dependency>
                        <groupId>junit</groupId>
                        <artifactId>junit</artifactId>
                        <version>4.13</version>
                        <scope>test</scope>
                    </dependency>
                </dependencies>
            </project>"#,
        )
        .unwrap();

        assert_eq!(project.coordinate, Coordinate::new("com.example", "my-app", "1.0.0"));
        assert_eq!(project.packaging, "jar");
        assert_eq!(project.main_class(), None);
        assert_eq!(project.dependencies.len(), 1);
        assert_eq!(project.dependencies[0].scope.as_deref(), Some("test"));
        assert_eq!(
            project.target_artifact_path(),
            PathBuf::from("/work/app/target/my-app-1.0.0.jar")
        );
    }

    #[test]
    fn test_group_and_version_inherited_from_parent() {
        let project = parse(
            r#"<project>
                <parent>
                    <groupId>org.parent</groupId>
                    <artifactId>pom-parent</artifactId>
                    <version>7</version>
                </parent>
                <artifactId>child</artifactId>
            </project>"#,
        )
        .unwrap();
        assert_eq!(project.coordinate, Coordinate::new("org.parent", "child", "7"));
    }

    #[test]
    fn test_main_class_from_jar_plugin_cdata() {
        let project = parse(
            r#"<project>
                <groupId><![CDATA[g]]></groupId>
                <artifactId><![CDATA[a]]></artifactId>
                <version><![CDATA[1]]></version>
                <build>
                    <finalName>app</finalName>
                    <plugins>
                        <plugin>
                            <artifactId>maven-jar-plugin</artifactId>
                            <configuration><archive><manifest>
                                <mainClass><![CDATA[a.b.Main]]></mainClass>
                            </manifest></archive></configuration>
                        </plugin>
                    </plugins>
                </build>
            </project>"#,
        )
        .unwrap();
        assert_eq!(project.main_class(), Some("a.b.Main"));
        assert_eq!(project.target_artifact_path(), PathBuf::from("/work/app/target/app.jar"));
    }

    #[test]
    fn test_missing_artifact_id_is_parse_error() {
        let err = parse("<project><groupId>g</groupId><version>1</version></project>").unwrap_err();
        assert!(matches!(err, JavapackError::DescriptorParse { .. }));
    }

    #[test]
    fn test_wrong_root_is_parse_error() {
        let err = parse("<settings/>").unwrap_err();
        assert!(err.to_string().contains("expected <project>"));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        assert!(matches!(
            parse("<project>").unwrap_err(),
            JavapackError::DescriptorParse { .. }
        ));
    }
}
