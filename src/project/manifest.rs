//! Reading `Class-Path` attributes out of archive manifests

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";
const CLASS_PATH_ATTRIBUTE: &str = "Class-Path";

/// Main-section attributes of a manifest, in file order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Manifest {
    attributes: Vec<(String, String)>,
}

impl Manifest {
    /// Parses manifest text. Lines starting with a single space continue the previous line;
    /// the main section ends at the first blank line.
    pub fn parse(text: &str) -> Self {
        let mut attributes: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = attributes.last_mut() {
                    value.push_str(continuation);
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                attributes.push((name.trim().to_string(), value.trim_start().to_string()));
            }
        }
        Self { attributes }
    }

    /// Attribute names are case-insensitive
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Elements of the `Class-Path` attribute, split on runs of spaces
    pub fn class_path(&self) -> Vec<String> {
        self.get(CLASS_PATH_ATTRIBUTE)
            .map(|value| value.split(' ').filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default()
    }
}

/// Reads the manifest of the archive at `path`; `None` when it has none
pub fn read_archive_manifest(path: &Path) -> Result<Option<Manifest>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a readable archive", path.display()))?;

    let mut entry = match archive.by_name(MANIFEST_ENTRY) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read manifest of {}", path.display()))
        }
    };

    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .with_context(|| format!("Manifest of {} is not UTF-8", path.display()))?;
    Ok(Some(Manifest::parse(&text)))
}
