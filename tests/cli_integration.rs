mod support;

use serde_json::Value;
use std::fs;
use std::process::{Command, Output};
use support::{javapack_bin, HELLO};
use tempfile::TempDir;

fn javapack() -> Command {
    let mut cmd = Command::new(javapack_bin());
    for var in [
        "CLASSPATH",
        "JAVAPACK_CLASSPATH",
        "JAVAPACK_OFFLINE",
        "JAVAPACK_VERBOSE",
        "JAVAPACK_DEBUG",
        "JAVAPACK_LOG_LEVEL",
        "JAVAPACK_MVN",
        "JAVAPACK_JAVA",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cli_help() {
    let output = javapack().arg("--help").output().expect("Failed to execute javapack");

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["run", "compile", "package", "pom", "config"] {
        assert!(text.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_cli_version() {
    let output = javapack().arg("--version").output().expect("Failed to execute javapack");

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_pom_for_loose_source_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Hello.java");
    fs::write(&file, HELLO).unwrap();

    let output = javapack().arg("pom").arg(&file).output().expect("Failed to execute javapack");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let xml = stdout(&output);
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<groupId><![CDATA[org.javapack.synthetic]]></groupId>"));
    assert!(xml.contains("<artifactId><![CDATA[Hello]]></artifactId>"));
    assert!(xml.contains("<mainClass><![CDATA[Hello]]></mainClass>"));
    assert!(xml.contains("<dependencies/>"));
}

#[test]
fn test_pom_json_lists_classpath_dependencies() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Hello.java");
    fs::write(&file, HELLO).unwrap();
    let jar = dir.path().join("commons-lang3-3.12.0.jar");
    fs::write(&jar, b"PK").unwrap();

    let output = javapack()
        .args(["pom", "--format", "json", "--classpath"])
        .arg(&jar)
        .arg(&file)
        .output()
        .expect("Failed to execute javapack");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["project"]["coordinate"]["artifact_id"], "Hello");
    assert_eq!(value["main_class"], "Hello");
    assert_eq!(value["synthesized"], true);
    assert_eq!(
        value["project"]["dependencies"][0]["coordinate"]["artifact_id"],
        "commons-lang3-3"
    );
    assert!(value["project"]["dependencies"][0]["scope"].is_null());
}

#[test]
fn test_current_directory_on_classpath_becomes_placeholder_dependency() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Hello.java");
    fs::write(&file, HELLO).unwrap();

    let output = javapack()
        .args(["pom", "--format", "json"])
        .arg(&file)
        .env("CLASSPATH", ".")
        .output()
        .expect("Failed to execute javapack");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        value["project"]["dependencies"][0]["coordinate"]["artifact_id"],
        "dependency"
    );
}

#[test]
fn test_pom_reads_source_from_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = javapack()
        .args(["pom", "--format", "json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute javapack");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"package demo;\npublic class Piped {}\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["project"]["coordinate"]["artifact_id"], "Piped");
    assert_eq!(value["main_class"], "demo.Piped");
}

#[test]
fn test_path_mismatch_fails() {
    let dir = TempDir::new().unwrap();
    let source_dir = dir.path().join("src/main/java/right");
    fs::create_dir_all(&source_dir).unwrap();
    let file = source_dir.join("Thing.java");
    fs::write(&file, "package wrong;\npublic class Thing {}\n").unwrap();

    let output = javapack().arg("pom").arg(&file).output().expect("Failed to execute javapack");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid directory"));
}

#[test]
fn test_config_json() {
    let output = javapack()
        .args(["config", "--format", "json"])
        .env("JAVAPACK_MVN", "mvnw")
        .env("JAVAPACK_OFFLINE", "true")
        .output()
        .expect("Failed to execute javapack");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["mvn"], "mvnw");
    assert_eq!(value["offline"], "true");
    assert_eq!(value["java"], "java");
}

#[test]
fn test_unparsable_flag_is_config_error() {
    let output = javapack()
        .args(["config"])
        .env("JAVAPACK_OFFLINE", "sometimes")
        .output()
        .expect("Failed to execute javapack");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("JAVAPACK_OFFLINE"));
}

#[test]
fn test_invalid_log_level_is_config_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Hello.java");
    fs::write(&file, HELLO).unwrap();

    let output = javapack()
        .arg("pom")
        .arg(&file)
        .env("JAVAPACK_LOG_LEVEL", "loud")
        .output()
        .expect("Failed to execute javapack");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Invalid log level"));
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    let output = javapack()
        .args(["-q", "-v", "config"])
        .output()
        .expect("Failed to execute javapack");

    assert!(!output.status.success());
}
