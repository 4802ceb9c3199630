//! Command handlers; each returns the process exit code

use super::commands::{CompileArgs, ConfigArgs, PackageArgs, PomArgs, RunArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::build::{BuildOrchestrator, DiagnosticsSink, Outcome, ScriptBindings};
use crate::config::JavapackConfig;
use crate::project::DESCRIPTOR_FILE_NAME;
use crate::source::{SourceUnit, SOURCE_SUFFIX};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

fn exit_code<T>(result: Result<Outcome<T>>) -> i32 {
    match result {
        Ok(Outcome::Succeeded(_)) => EXIT_SUCCESS,
        Ok(Outcome::ReportedFailure) => EXIT_FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

async fn read_stdin() -> Result<String> {
    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read Java source from stdin")?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn handle_run(args: &RunArgs, orchestrator: &BuildOrchestrator) -> i32 {
    exit_code(run(args, orchestrator).await)
}

async fn run(args: &RunArgs, orchestrator: &BuildOrchestrator) -> Result<Outcome> {
    let mut bindings = ScriptBindings::new();
    for define in &args.defines {
        let (key, value) = ScriptBindings::parse_assignment(define);
        bindings.set(key, value);
    }

    let (text, hint) = match &args.file {
        Some(file) => {
            // the file itself is what gets built; the text only has to exist
            let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
            (
                String::from_utf8_lossy(&bytes).into_owned(),
                Some(file.to_string_lossy().into_owned()),
            )
        }
        None => (read_stdin().await?, None),
    };
    debug!(bindings = ?bindings, "Evaluating source");

    let outcome = orchestrator
        .evaluate(
            &text,
            hint.as_deref(),
            &bindings,
            &args.arguments,
            Some(DiagnosticsSink::stderr()),
        )
        .await?;
    Ok(outcome)
}

pub async fn handle_compile(args: &CompileArgs, orchestrator: &BuildOrchestrator) -> i32 {
    let result = orchestrator
        .compile(&args.file, Some(DiagnosticsSink::stderr()))
        .await
        .with_context(|| format!("Failed to compile {}", args.file.display()));
    if matches!(result, Ok(Outcome::Succeeded(_))) {
        info!("Compiled {}", args.file.display());
    }
    exit_code(result)
}

/// `<Name>.jar` in the working directory for a source file; `None` for a descriptor, whose
/// archive stays in its own `target` directory.
pub fn default_archive_path(file: &Path) -> Option<PathBuf> {
    let name = file.file_name()?.to_str()?;
    if name == DESCRIPTOR_FILE_NAME {
        return None;
    }
    let stem = name.strip_suffix(SOURCE_SUFFIX).unwrap_or(name);
    Some(PathBuf::from(format!("{}.jar", stem)))
}

pub async fn handle_package(args: &PackageArgs, orchestrator: &BuildOrchestrator) -> i32 {
    let output = args
        .output
        .clone()
        .or_else(|| default_archive_path(&args.file));
    let result = orchestrator
        .package_to_archive(
            &args.file,
            args.sources,
            output.as_deref(),
            Some(DiagnosticsSink::stderr()),
        )
        .await
        .with_context(|| format!("Failed to package {}", args.file.display()));

    if let Ok(Outcome::Succeeded(Some(archive))) = &result {
        println!("{}", archive.display());
    }
    exit_code(result)
}

pub async fn handle_pom(args: &PomArgs, orchestrator: &BuildOrchestrator) -> i32 {
    match pom(args, orchestrator).await {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

async fn pom(args: &PomArgs, orchestrator: &BuildOrchestrator) -> Result<String> {
    let (source, hint) = match &args.file {
        Some(file) => (
            SourceUnit::File(file.clone()),
            Some(file.to_string_lossy().into_owned()),
        ),
        None => (SourceUnit::Text(read_stdin().await?), None),
    };
    let description = orchestrator
        .describe(&source, hint.as_deref())
        .await
        .context("Failed to determine project descriptor")?;
    OutputFormatter::new(args.format.into()).format_description(&description)
}

pub fn handle_config(args: &ConfigArgs, config: &JavapackConfig) -> i32 {
    let format: OutputFormat = args.format.into();
    match OutputFormatter::new(format).format_config(config) {
        Ok(output) => {
            print!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_archive_path() {
        assert_eq!(
            default_archive_path(Path::new("/src/Hello.java")),
            Some(PathBuf::from("Hello.jar"))
        );
        assert_eq!(default_archive_path(Path::new("/proj/pom.xml")), None);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code::<()>(Ok(Outcome::Succeeded(()))), EXIT_SUCCESS);
        assert_eq!(exit_code::<()>(Ok(Outcome::ReportedFailure)), EXIT_FAILURE);
        assert_eq!(exit_code::<()>(Err(anyhow::anyhow!("boom"))), EXIT_FAILURE);
    }
}
