//! Configuration for javapack
//!
//! Settings are read from environment variables with defaults; command-line flags override them.
//!
//! # Environment Variables
//!
//! - `JAVAPACK_MVN`: Maven executable - default: "mvn"
//! - `JAVAPACK_JAVA`: Java launcher executable - default: "java"
//! - `JAVAPACK_OFFLINE`: Run Maven offline (true|false) - default: "false"
//! - `JAVAPACK_VERBOSE`: Default `verbose` binding (true|false) - default: "false"
//! - `JAVAPACK_DEBUG`: Default `debug` binding (true|false) - default: "false"
//! - `JAVAPACK_LOG_LEVEL`: Logging level - default: "info"
//! - `JAVAPACK_CLASSPATH`: Extra host classpath, most specific first
//! - `CLASSPATH`: Host classpath consulted after `JAVAPACK_CLASSPATH`
//!
//! # Example
//!
//! ```no_run
//! use javapack::JavapackConfig;
//!
//! let config = JavapackConfig::default();
//! config.validate().expect("Invalid configuration");
//! let orchestrator = config.create_orchestrator();
//! ```

use crate::build::{BuildOrchestrator, MavenEngine, ScriptBindings};
use crate::project::ClasspathProvider;
use crate::run::JavaLauncher;
use crate::util::logging::is_valid_level;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_MVN: &str = "mvn";
const DEFAULT_JAVA: &str = "java";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavapackConfig {
    pub mvn: PathBuf,
    pub java: PathBuf,
    pub offline: bool,
    pub verbose: bool,
    pub debug: bool,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Platform path list given with `--classpath`
    pub cli_classpath: Option<String>,
    /// `JAVAPACK_CLASSPATH`
    pub extra_classpath: Option<String>,
    /// `CLASSPATH`
    pub system_classpath: Option<String>,
}

fn env_flag(name: &str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(false),
        Ok(value) => value.trim().parse::<bool>().map_err(|e| ConfigError::ParseError {
            field: name.to_string(),
            error: e.to_string(),
        }),
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for JavapackConfig {
    /// Loads from environment variables; unparsable flags read as `false`
    fn default() -> Self {
        Self::base_from_env()
    }
}

impl JavapackConfig {
    fn base_from_env() -> Self {
        Self {
            mvn: env_nonempty("JAVAPACK_MVN")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MVN)),
            java: env_nonempty("JAVAPACK_JAVA")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_JAVA)),
            offline: env_flag("JAVAPACK_OFFLINE").unwrap_or(false),
            verbose: env_flag("JAVAPACK_VERBOSE").unwrap_or(false),
            debug: env_flag("JAVAPACK_DEBUG").unwrap_or(false),
            log_level: env::var("JAVAPACK_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
            cli_classpath: None,
            extra_classpath: env_nonempty("JAVAPACK_CLASSPATH"),
            system_classpath: env_nonempty("CLASSPATH"),
        }
    }

    /// Loads from environment variables, failing on unparsable flags
    pub fn from_env() -> Result<Self, ConfigError> {
        for flag in ["JAVAPACK_OFFLINE", "JAVAPACK_VERBOSE", "JAVAPACK_DEBUG"] {
            env_flag(flag)?;
        }
        Ok(Self::base_from_env())
    }

    pub fn with_cli_classpath(mut self, classpath: Option<String>) -> Self {
        self.cli_classpath = classpath.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, executable) in [("JAVAPACK_MVN", &self.mvn), ("JAVAPACK_JAVA", &self.java)] {
            if executable.as_os_str().is_empty() {
                return Err(ConfigError::ValidationFailed(format!("{} is empty", name)));
            }
            // bare names are looked up on PATH when spawned
            if executable.components().count() > 1 && !executable.exists() {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} points to a missing file: {}",
                    name,
                    executable.display()
                )));
            }
        }

        if !is_valid_level(&self.log_level) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Bindings every build starts from
    pub fn default_bindings(&self) -> ScriptBindings {
        let mut bindings = ScriptBindings::new();
        bindings
            .set("verbose", self.verbose.to_string())
            .set("debug", self.debug.to_string());
        bindings
    }

    /// Host classpath providers, most specific first
    pub fn classpath_providers(&self) -> Vec<ClasspathProvider> {
        [
            ("cli", &self.cli_classpath),
            ("javapack", &self.extra_classpath),
            ("system", &self.system_classpath),
        ]
        .into_iter()
        .filter_map(|(name, list)| list.as_ref().map(|l| ClasspathProvider::from_path_list(name, l)))
        .collect()
    }

    pub fn create_orchestrator(&self) -> BuildOrchestrator {
        let engine = MavenEngine::new(&self.mvn).with_offline(self.offline);
        BuildOrchestrator::new(Arc::new(engine), Arc::new(JavaLauncher::new(&self.java)))
            .with_providers(self.classpath_providers())
            .with_default_bindings(self.default_bindings())
    }

    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("mvn".to_string(), self.mvn.display().to_string());
        map.insert("java".to_string(), self.java.display().to_string());
        map.insert("offline".to_string(), self.offline.to_string());
        map.insert("verbose".to_string(), self.verbose.to_string());
        map.insert("debug".to_string(), self.debug.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());
        for (key, value) in [
            ("cli_classpath", &self.cli_classpath),
            ("extra_classpath", &self.extra_classpath),
            ("system_classpath", &self.system_classpath),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), value.clone());
            }
        }
        map
    }
}

impl fmt::Display for JavapackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Javapack Configuration:")?;
        writeln!(f, "  Maven: {}", self.mvn.display())?;
        writeln!(f, "  Java: {}", self.java.display())?;
        writeln!(f, "  Offline: {}", self.offline)?;
        writeln!(f, "  Verbose: {}", self.verbose)?;
        writeln!(f, "  Debug: {}", self.debug)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        let providers = self.classpath_providers();
        if providers.is_empty() {
            writeln!(f, "  Host Classpath: (none)")?;
        } else {
            writeln!(f, "  Host Classpath:")?;
            for provider in providers {
                writeln!(f, "    {} ({} entries)", provider.name, provider.entries.len())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clean_env() -> Vec<EnvGuard> {
        [
            "JAVAPACK_MVN",
            "JAVAPACK_JAVA",
            "JAVAPACK_OFFLINE",
            "JAVAPACK_VERBOSE",
            "JAVAPACK_DEBUG",
            "JAVAPACK_LOG_LEVEL",
            "JAVAPACK_CLASSPATH",
            "CLASSPATH",
        ]
        .into_iter()
        .map(EnvGuard::unset)
        .collect()
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clean_env();
        let config = JavapackConfig::default();

        assert_eq!(config.mvn, PathBuf::from(DEFAULT_MVN));
        assert_eq!(config.java, PathBuf::from(DEFAULT_JAVA));
        assert!(!config.offline);
        assert!(!config.verbose);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.classpath_providers().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let mut guards = clean_env();
        guards.push(EnvGuard::set("JAVAPACK_MVN", "mvnw"));
        guards.push(EnvGuard::set("JAVAPACK_OFFLINE", "true"));
        guards.push(EnvGuard::set("JAVAPACK_VERBOSE", "true"));
        guards.push(EnvGuard::set("JAVAPACK_LOG_LEVEL", "DEBUG"));
        guards.push(EnvGuard::set("CLASSPATH", "/sys/a.jar"));

        let config = JavapackConfig::from_env().unwrap();
        assert_eq!(config.mvn, PathBuf::from("mvnw"));
        assert!(config.offline);
        assert!(config.verbose);
        assert!(!config.debug);
        assert_eq!(config.log_level, "debug");
        assert!(config.default_bindings().flag("verbose"));
        assert!(!config.default_bindings().flag("debug"));
    }

    #[test]
    #[serial]
    fn test_unparsable_flag() {
        let mut guards = clean_env();
        guards.push(EnvGuard::set("JAVAPACK_OFFLINE", "maybe"));

        let err = JavapackConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref field, .. } if field == "JAVAPACK_OFFLINE"));
        assert!(!JavapackConfig::default().offline);
    }

    #[test]
    #[serial]
    fn test_provider_order() {
        let mut guards = clean_env();
        guards.push(EnvGuard::set("JAVAPACK_CLASSPATH", "/extra/b.jar"));
        guards.push(EnvGuard::set("CLASSPATH", "/sys/c.jar"));

        let config = JavapackConfig::default().with_cli_classpath(Some("/cli/a.jar".to_string()));
        let names: Vec<String> = config
            .classpath_providers()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["cli", "javapack", "system"]);
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_values() {
        let _guards = clean_env();
        let mut config = JavapackConfig::default();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = JavapackConfig::default();
        config.mvn = PathBuf::from("/nonexistent/bin/mvn");
        assert!(config.validate().is_err());

        let mut config = JavapackConfig::default();
        config.java = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_config_display() {
        let _guards = clean_env();
        let config = JavapackConfig::default();
        let display = format!("{}", config);
        assert!(display.contains("Javapack Configuration:"));
        assert!(display.contains("Host Classpath: (none)"));
        assert_eq!(config.to_display_map().get("mvn").map(String::as_str), Some("mvn"));
    }
}
