//! Inference of a project's dependencies from the host classpath
//!
//! Everything already on the host classpath is declared as a dependency of a synthesized project
//! and registered with the build environment as resolved, so the build engine never tries to
//! fetch it from a repository.

use super::coordinate::{Coordinate, DEFAULT_GROUP_ID};
use super::manifest::read_archive_manifest;
use crate::build::environment::BuildEnvironment;
use regex::Regex;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

/// Artifact id used for entries whose name starts with a dot
pub const PLACEHOLDER_ARTIFACT_ID: &str = "dependency";

fn booster_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*/target/surefire/surefirebooter[0-9]*\.jar$").expect("valid regex")
    })
}

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").expect("valid regex"))
}

/// One level of the host's class-loading chain and the entries it contributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClasspathProvider {
    pub name: String,
    /// `file:` URLs, other URLs, or bare filesystem paths
    pub entries: Vec<String>,
}

impl ClasspathProvider {
    pub fn new(name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Builds a provider from a platform path list such as `$CLASSPATH`
    pub fn from_path_list(name: impl Into<String>, list: impl AsRef<OsStr>) -> Self {
        let entries = std::env::split_paths(list.as_ref())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        Self::new(name, entries)
    }
}

/// Walks classpath providers, most specific first
pub struct DependencyInferrer<'a> {
    providers: &'a [ClasspathProvider],
}

impl<'a> DependencyInferrer<'a> {
    pub fn new(providers: &'a [ClasspathProvider]) -> Self {
        Self { providers }
    }

    /// Synthesizes a coordinate for every local classpath entry and registers each one with `env`
    pub fn infer(&self, env: &mut BuildEnvironment) -> Vec<Coordinate> {
        let mut result = Vec::new();
        for provider in self.providers {
            trace!(provider = %provider.name, entries = provider.entries.len(), "Scanning classpath provider");
            for entry in &provider.entries {
                let Some((url, path)) = local_entry(entry) else {
                    trace!(entry = %entry, "Skipping non-local classpath entry");
                    continue;
                };
                if booster_pattern().is_match(&url) {
                    booster_dependencies(env, &path, &mut result);
                    continue;
                }
                result.push(fake_dependency(env, &path));
            }
        }
        debug!(count = result.len(), "Inferred dependencies from host classpath");
        result
    }
}

/// Derives an artifact id from a file name that is not yet known to `env`.
///
/// The id is the name up to its first dot with surrounding whitespace removed, suffixed `-1`,
/// `-2`, ... when taken. Names that leave nothing (`.`, `..`, `.hidden`) use
/// [`PLACEHOLDER_ARTIFACT_ID`].
pub fn synthesize_artifact_id(env: &BuildEnvironment, name: &str) -> String {
    let prefix = match name.find('.') {
        None => name,
        Some(dot) => &name[..dot],
    }
    .trim();
    let prefix = if prefix.is_empty() {
        PLACEHOLDER_ARTIFACT_ID
    } else {
        prefix
    };
    if !env.contains_project(DEFAULT_GROUP_ID, prefix) {
        return prefix.to_string();
    }
    (1..)
        .map(|i| format!("{}-{}", prefix, i))
        .find(|candidate| !env.contains_project(DEFAULT_GROUP_ID, candidate))
        .unwrap_or_else(|| prefix.to_string())
}

/// Last component of `path` as written; `.` and `..` are kept rather than dropped
fn entry_name(path: &Path) -> String {
    match path.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        Some(Component::CurDir) => ".".to_string(),
        Some(Component::ParentDir) => "..".to_string(),
        _ => String::new(),
    }
}

fn fake_dependency(env: &mut BuildEnvironment, path: &Path) -> Coordinate {
    let coordinate = Coordinate::inferred(synthesize_artifact_id(env, &entry_name(path)));
    env.register_synthetic_descriptor(path, &coordinate);
    coordinate
}

/// Replaces a test-runner booster archive by the entries its manifest points to
fn booster_dependencies(env: &mut BuildEnvironment, booster: &Path, result: &mut Vec<Coordinate>) {
    let manifest = match read_archive_manifest(booster) {
        Ok(Some(manifest)) => manifest,
        Ok(None) => {
            debug!(path = %booster.display(), "Booster archive has no manifest");
            return;
        }
        Err(e) => {
            warn!(path = %booster.display(), error = %e, "Could not read booster archive");
            return;
        }
    };

    let base = booster.parent().unwrap_or(Path::new("/"));
    for element in manifest.class_path() {
        match resolve_class_path_element(base, &element) {
            Some(path) => result.push(fake_dependency(env, &path)),
            None => warn!(element = %element, "Skipping unresolvable booster class path element"),
        }
    }
}

/// Splits a classpath entry into its URL form and local path; `None` for non-file URLs
fn local_entry(entry: &str) -> Option<(String, PathBuf)> {
    if let Some(path) = file_url_path(entry) {
        return Some((entry.to_string(), path));
    }
    if is_url(entry) {
        return None;
    }
    let url = format!("file:{}", entry.replace('\\', "/"));
    Some((url, PathBuf::from(entry)))
}

fn is_url(entry: &str) -> bool {
    // two or more letters so a drive letter such as `C:` stays a path
    scheme_pattern().is_match(entry)
}

fn file_url_path(entry: &str) -> Option<PathBuf> {
    let rest = entry.strip_prefix("file:")?;
    let rest = rest.strip_prefix("//localhost").or_else(|| rest.strip_prefix("//")).unwrap_or(rest);
    let decoded = urlencoding::decode(rest)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| rest.to_string());
    Some(PathBuf::from(decoded))
}

fn resolve_class_path_element(base: &Path, element: &str) -> Option<PathBuf> {
    if let Some(path) = file_url_path(element) {
        return Some(path);
    }
    if is_url(element) {
        return None;
    }
    let decoded = urlencoding::decode(element).ok()?.into_owned();
    let path = PathBuf::from(&decoded);
    if path.is_absolute() {
        Some(path)
    } else {
        Some(base.join(path))
    }
}
