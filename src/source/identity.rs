//! Discovery of the primary type declared by a single Java source file
//!
//! Only the leading part of the file is scanned: blank lines, line comments and block comments
//! are skipped, the first `package` line sets the package and the first public type declaration
//! ends the scan. This mirrors the language rule that the package declaration comes first.

use crate::error::{JavapackError, Result};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Suffix every compilable source unit carries
pub const SOURCE_SUFFIX: &str = ".java";

/// Package and simple name of the primary type of a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    /// Dot-separated package path, empty for the default package
    pub package: String,
    pub simple_name: String,
}

impl TypeIdentity {
    pub fn new(package: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            simple_name: simple_name.into(),
        }
    }

    pub fn fully_qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.package, self.simple_name)
        }
    }

    /// Location of the source file relative to a source root, e.g. `a/b/Foo.java`
    pub fn relative_source_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.package.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}{}", self.simple_name, SOURCE_SUFFIX));
        path
    }
}

impl std::fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fully_qualified_name())
    }
}

fn package_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^package\s+([a-zA-Z0-9_.]*)").expect("valid regex"))
}

fn type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\bpublic\s+(?:(?:abstract|final|static|sealed|non-sealed|strictfp)\s+)*(?:class|interface|enum|record|@interface)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
        )
        .expect("valid regex")
    })
}

/// Lines of `reader` as raw bytes, without their `\n` or `\r\n` terminator.
///
/// Source files are not required to be UTF-8; callers decode as they see fit.
pub fn byte_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = io::Result<Vec<u8>>> {
    std::iter::from_fn(move || {
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.ends_with(b"\n") {
                    line.pop();
                    if line.ends_with(b"\r") {
                        line.pop();
                    }
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    })
}

/// Identifies the primary type of `reader`, a source unit named `file_name`.
///
/// Fails with [`JavapackError::MalformedSource`] when `file_name` lacks the `.java` suffix.
/// When no public type is declared the simple name is the file name without its suffix.
pub fn identify<R: BufRead>(file_name: &str, reader: R) -> Result<TypeIdentity> {
    let stem = file_name
        .strip_suffix(SOURCE_SUFFIX)
        .ok_or_else(|| JavapackError::MalformedSource {
            name: file_name.to_string(),
            reason: format!("expected a {} suffix", SOURCE_SUFFIX),
        })?;

    let mut package = String::new();
    let mut simple_name = None;
    let mut lines =
        byte_lines(reader).map(|line| line.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()));

    'scan: while let Some(line) = lines.next() {
        let mut line = line
            .map_err(|e| JavapackError::io(file_name, e))?
            .trim()
            .to_string();

        while line.starts_with("/*") {
            let mut rest = line[2..].find("*/").map(|end| line[end + 4..].to_string());
            while rest.is_none() {
                match lines.next() {
                    // unterminated block comment: nothing left to scan
                    None => break 'scan,
                    Some(next) => {
                        let next = next.map_err(|e| JavapackError::io(file_name, e))?;
                        rest = next.find("*/").map(|end| next[end + 2..].to_string());
                    }
                }
            }
            line = rest.unwrap_or_default().trim().to_string();
        }

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if let Some(caps) = package_pattern().captures(&line) {
            package = caps[1].to_string();
        }
        if let Some(caps) = type_pattern().captures(&line) {
            simple_name = Some(caps[1].to_string());
            break;
        }
    }

    Ok(TypeIdentity {
        package,
        simple_name: simple_name.unwrap_or_else(|| stem.to_string()),
    })
}

/// Identifies the primary type of in-memory source text
pub fn identify_str(file_name: &str, text: &str) -> Result<TypeIdentity> {
    identify(file_name, text.as_bytes())
}

/// Identifies the primary type of the source file at `path`
pub fn identify_file(path: &Path) -> Result<TypeIdentity> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !file_name.ends_with(SOURCE_SUFFIX) {
        return Err(JavapackError::MalformedSource {
            name: path.display().to_string(),
            reason: format!("expected a {} suffix", SOURCE_SUFFIX),
        });
    }
    let file = File::open(path).map_err(|e| JavapackError::io(path, e))?;
    identify(&file_name, BufReader::new(file))
}
