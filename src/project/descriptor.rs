//! Synthesized project descriptors and their XML form
//!
//! Every leaf value is written as a CDATA section so that class names and artifact ids with
//! unusual characters survive a write/parse cycle unchanged.

use super::coordinate::Coordinate;
use super::model::{Project, PACKAGING_PLUGIN};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const POM_SCHEMA_LOCATION: &str =
    "http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd";
const INDENT: &str = "    ";

/// Minimal description of a project to hand to the build engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDescriptor {
    pub coordinate: Coordinate,
    pub main_class: Option<String>,
    pub dependencies: Vec<Coordinate>,
    /// Directory the descriptor is materialized in
    pub directory: PathBuf,
}

impl ProjectDescriptor {
    pub fn new(coordinate: Coordinate, directory: impl Into<PathBuf>) -> Self {
        Self {
            coordinate,
            main_class: None,
            dependencies: Vec::new(),
            directory: directory.into(),
        }
    }

    pub fn with_main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Coordinate>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Rebuilds the descriptor of a parsed project
    pub fn from_project(project: &Project) -> Self {
        Self {
            coordinate: project.coordinate.clone(),
            main_class: project.main_class.clone(),
            dependencies: project.dependency_coordinates(),
            directory: project.directory.clone(),
        }
    }

    /// Renders the descriptor as a UTF-8 XML document
    pub fn to_xml(&self) -> String {
        self.render(&BTreeMap::new())
    }

    /// Renders the descriptor, declaring the dependencies found in `system_paths` as
    /// `system`-scoped artifacts at the given local paths.
    pub fn to_xml_with_system_paths(&self, system_paths: &BTreeMap<Coordinate, PathBuf>) -> String {
        self.render(system_paths)
    }

    fn render(&self, system_paths: &BTreeMap<Coordinate, PathBuf>) -> String {
        let mut xml = XmlWriter::new();
        xml.declaration();
        xml.open_with_attributes(
            "project",
            &[
                ("xmlns", POM_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("xsi:schemaLocation", POM_SCHEMA_LOCATION),
            ],
        );
        xml.leaf("modelVersion", "4.0.0");
        xml.leaf("groupId", &self.coordinate.group_id);
        xml.leaf("artifactId", &self.coordinate.artifact_id);
        xml.leaf("version", &self.coordinate.version);

        match &self.main_class {
            Some(main_class) => {
                xml.open("build");
                xml.open("plugins");
                xml.open("plugin");
                xml.leaf("artifactId", PACKAGING_PLUGIN);
                xml.open("configuration");
                xml.open("archive");
                xml.open("manifest");
                xml.leaf("mainClass", main_class);
                xml.close("manifest");
                xml.close("archive");
                xml.close("configuration");
                xml.close("plugin");
                xml.close("plugins");
                xml.close("build");
            }
            None => xml.empty("build"),
        }

        if self.dependencies.is_empty() {
            xml.empty("dependencies");
        } else {
            xml.open("dependencies");
            for dependency in &self.dependencies {
                xml.open("dependency");
                xml.leaf("groupId", &dependency.group_id);
                xml.leaf("artifactId", &dependency.artifact_id);
                xml.leaf("version", &dependency.version);
                if let Some(path) = system_paths.get(dependency) {
                    xml.leaf("scope", "system");
                    xml.leaf("systemPath", &path.to_string_lossy());
                }
                xml.close("dependency");
            }
            xml.close("dependencies");
        }

        xml.close("project");
        xml.finish()
    }

    /// Path the descriptor is written to inside `directory`
    pub fn descriptor_path(&self) -> PathBuf {
        descriptor_path_in(&self.directory)
    }
}

pub(crate) fn descriptor_path_in(directory: &Path) -> PathBuf {
    directory.join(super::model::DESCRIPTOR_FILE_NAME)
}

/// Indenting writer for the fixed descriptor schema
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn declaration(&mut self) {
        self.out
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn open(&mut self, tag: &str) {
        self.open_with_attributes(tag, &[]);
    }

    fn open_with_attributes(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attributes {
            self.out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str(&format!("</{}>\n", tag));
    }

    fn empty(&mut self, tag: &str) {
        self.indent();
        self.out.push_str(&format!("<{}/>\n", tag));
    }

    fn leaf(&mut self, tag: &str, text: &str) {
        self.indent();
        self.out
            .push_str(&format!("<{tag}>{}</{tag}>\n", cdata(text), tag = tag));
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Wraps `text` in CDATA, splitting any `]]>` it contains across two sections
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn descriptor() -> ProjectDescriptor {
        ProjectDescriptor::new(Coordinate::synthesized("Hello"), "/tmp/ws")
            .with_main_class("demo.Hello")
            .with_dependencies(vec![
                Coordinate::inferred("commons-lang3"),
                Coordinate::inferred("guava"),
            ])
    }

    #[test]
    fn test_write_then_parse_preserves_everything() {
        let descriptor = descriptor();
        let xml = descriptor.to_xml();
        let project =
            Project::from_xml(&xml, Path::new("/tmp/ws"), Path::new("/tmp/ws/pom.xml")).unwrap();

        assert_eq!(project.coordinate, descriptor.coordinate);
        assert_eq!(project.main_class(), Some("demo.Hello"));
        assert_eq!(project.dependency_coordinates(), descriptor.dependencies);
        assert_eq!(ProjectDescriptor::from_project(&project), descriptor);
    }

    #[test]
    fn test_unusual_characters_survive() {
        let descriptor = ProjectDescriptor::new(Coordinate::synthesized("a&b<c>]]>d"), "/tmp/ws")
            .with_main_class("x.Y$Z");
        let xml = descriptor.to_xml();
        assert!(xml.contains("<![CDATA[a&b<c>]]]]><![CDATA[>d]]>"));

        let project =
            Project::from_xml(&xml, Path::new("/tmp/ws"), Path::new("/tmp/ws/pom.xml")).unwrap();
        assert_eq!(project.coordinate.artifact_id, "a&b<c>]]>d");
        assert_eq!(project.main_class(), Some("x.Y$Z"));
    }

    #[test]
    fn test_layout_and_namespaces() {
        let xml = descriptor().to_xml();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\""));
        assert!(xml.contains("xmlns=\"http://maven.apache.org/POM/4.0.0\""));
        assert!(xml.contains("xsi:schemaLocation="));
        assert!(xml.contains("\n    <artifactId><![CDATA[Hello]]></artifactId>\n"));
        assert!(xml.contains("<artifactId><![CDATA[maven-jar-plugin]]></artifactId>"));
        assert!(xml.contains("<mainClass><![CDATA[demo.Hello]]></mainClass>"));
    }

    #[test]
    fn test_no_main_class_has_empty_build() {
        let xml = ProjectDescriptor::new(Coordinate::synthesized("Lib"), "/tmp/ws").to_xml();
        assert!(xml.contains("<build/>"));
        assert!(!xml.contains("mainClass"));
    }

    #[test]
    fn test_system_paths_add_scope() {
        let descriptor = descriptor();
        let mut paths = BTreeMap::new();
        paths.insert(Coordinate::inferred("guava"), PathBuf::from("/libs/guava.jar"));
        let xml = descriptor.to_xml_with_system_paths(&paths);

        let project =
            Project::from_xml(&xml, Path::new("/tmp/ws"), Path::new("/tmp/ws/pom.xml")).unwrap();
        assert_eq!(project.dependencies[0].scope, None);
        assert_eq!(project.dependencies[1].scope.as_deref(), Some("system"));
        assert!(xml.contains("<systemPath><![CDATA[/libs/guava.jar]]></systemPath>"));
    }
}
