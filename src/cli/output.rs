//! Output formatting for the `pom` and `config` commands

use anyhow::{Context, Result};
use std::fmt::Write;

use crate::build::ProjectDescription;
use crate::config::JavapackConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The descriptor document itself
    Xml,
    Json,
    Yaml,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_description(&self, description: &ProjectDescription) -> Result<String> {
        match self.format {
            OutputFormat::Xml => Ok(description.descriptor.clone()),
            OutputFormat::Json => serde_json::to_string_pretty(description)
                .context("Failed to serialize project description to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(description)
                .context("Failed to serialize project description to YAML"),
            OutputFormat::Human => Ok(self.format_description_human(description)),
        }
    }

    /// Formats the configuration; XML is not offered and falls back to human output
    pub fn format_config(&self, config: &JavapackConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&config.to_display_map())
                .context("Failed to serialize config to YAML"),
            OutputFormat::Xml | OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_description_human(&self, description: &ProjectDescription) -> String {
        let project = &description.project;
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "Project: {}", project.coordinate);
        let _ = writeln!(out, "  Packaging: {}", project.packaging);
        let _ = writeln!(
            out,
            "  Main Class: {}",
            description.main_class.as_deref().unwrap_or("(none)")
        );
        let _ = writeln!(out, "  Directory: {}", project.directory.display());
        if description.synthesized {
            let _ = writeln!(out, "  Synthesized: yes (removed after the command)");
        }
        if project.dependencies.is_empty() {
            let _ = writeln!(out, "  Dependencies: (none)");
        } else {
            let _ = writeln!(out, "  Dependencies:");
            for dependency in &project.dependencies {
                match &dependency.scope {
                    Some(scope) => {
                        let _ = writeln!(out, "    - {} ({})", dependency.coordinate, scope);
                    }
                    None => {
                        let _ = writeln!(out, "    - {}", dependency.coordinate);
                    }
                }
            }
        }
        out
    }
}
