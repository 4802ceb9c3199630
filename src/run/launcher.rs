//! [`ClassRunner`] that starts a separate `java` process

use super::runner::{ClassRunner, ExecutionContext};
use crate::error::{JavapackError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JavaLauncher {
    executable: PathBuf,
}

impl Default for JavaLauncher {
    fn default() -> Self {
        Self::new("java")
    }
}

impl JavaLauncher {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn command_args(&self, main_class: &str, context: &ExecutionContext) -> Result<Vec<OsString>> {
        let classpath = context
            .classpath_string()
            .map_err(|e| JavapackError::ExecutionFailed {
                main_class: main_class.to_string(),
                reason: e.to_string(),
            })?;
        let mut args = vec![OsString::from("-cp"), classpath, OsString::from(main_class)];
        args.extend(context.arguments.iter().map(OsString::from));
        Ok(args)
    }
}

#[async_trait]
impl ClassRunner for JavaLauncher {
    async fn run_class(&self, main_class: &str, context: &ExecutionContext) -> Result<()> {
        let args = self.command_args(main_class, context)?;
        let failed = |reason: String| JavapackError::ExecutionFailed {
            main_class: main_class.to_string(),
            reason,
        };

        debug!(executable = %self.executable.display(), main_class, "Launching JVM");
        let mut command = Command::new(&self.executable);
        command
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = command
            .status()
            .await
            .map_err(|e| failed(format!("could not start {}: {}", self.executable.display(), e)))?;
        if status.success() {
            return Ok(());
        }
        Err(failed(match status.code() {
            Some(code) => format!("exit status {}", code),
            None => "terminated by a signal".to_string(),
        }))
    }
}
