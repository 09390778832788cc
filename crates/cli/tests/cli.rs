//! Process-level tests: exit codes, stdout purity, stdin input

use assert_cmd::Command;
use serde_json::Value;
use std::io::Write;
use std::process::Output;
use tempfile::NamedTempFile;

const ORDER: &str = r#"using System;

namespace Shop
{
    public class Line { }

    public class Order
    {
        public Order(Line first)
        {
            if (first == null) throw new ArgumentNullException(nameof(first));
        }

        public Line First { get; set; }
    }
}
"#;

fn cs_structure() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cs-structure"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn source_file(text: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".cs").tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is a single JSON document")
}

#[test]
fn test_extracts_classes_from_path_argument() {
    let file = source_file(ORDER);
    let output = cs_structure().arg(file.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let classes = json(&output);
    let classes = classes.as_array().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[1]["ClassName"], "Order");
    assert_eq!(classes[1]["NamespaceName"], "Shop");
    assert_eq!(
        classes[1]["Constructors"][0]["ExceptionConditions"][0]["ExceptionType"],
        "ArgumentNullException"
    );
    assert!(classes[1]["ReferencedTypeDefinitions"]
        .get("Shop.Line")
        .is_some());
}

#[test]
fn test_reads_path_from_stdin() {
    let file = source_file(ORDER);
    let output = cs_structure()
        .write_stdin(format!("  {}\n", file.path().display()))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(json(&output).as_array().unwrap().len(), 2);
}

#[test]
fn test_file_without_classes_prints_empty_array() {
    let file = source_file("namespace Empty { public interface IThing { } }");
    let output = cs_structure().arg(file.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn test_nonexistent_path_exits_with_input_error() {
    let output = cs_structure()
        .arg("/definitely/not/here/Order.cs")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_empty_stdin_exits_with_input_error() {
    let output = cs_structure().write_stdin("   \n").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_config_exits_with_input_error() {
    let file = source_file(ORDER);
    let mut config = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    config.write_all(b"indent = \"xx\"\n").unwrap();

    let output = cs_structure()
        .arg(file.path())
        .arg("--config")
        .arg(config.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unknown_profile_exits_with_input_error() {
    let file = source_file(ORDER);
    let output = cs_structure()
        .arg(file.path())
        .args(["--profile", "everything"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_output_is_deterministic() {
    let file = source_file(ORDER);
    let first = cs_structure().arg(file.path()).output().unwrap();
    let second = cs_structure().arg(file.path()).output().unwrap();

    assert_eq!(first.status.code(), Some(0));
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_pretty_flag_indents_output() {
    let file = source_file(ORDER);
    let compact = cs_structure().arg(file.path()).output().unwrap();
    let pretty = cs_structure()
        .arg(file.path())
        .arg("--pretty")
        .output()
        .unwrap();

    assert_eq!(pretty.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&compact.stdout).lines().count(), 1);
    assert!(String::from_utf8_lossy(&pretty.stdout).lines().count() > 1);
    assert_eq!(json(&compact), json(&pretty));
}
