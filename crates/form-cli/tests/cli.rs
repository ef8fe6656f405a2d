use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::{Value, json};

fn write_fixture(dir: &tempfile::TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    let contents = serde_json::to_string_pretty(value).expect("serialize fixture");
    fs::write(&path, contents).expect("write fixture");
    path
}

fn sample_schema() -> Value {
    json!({
        "id": "visit",
        "title": "Visit",
        "version": "1.0.0",
        "sections": [
            {
                "id": "main",
                "title": "Main",
                "fields": [
                    { "id": "name", "type": "text", "label": "Name", "required": true },
                    {
                        "id": "age",
                        "type": "number",
                        "label": "Age",
                        "rules": { "min": 0.0, "max": 120.0 }
                    }
                ]
            }
        ]
    })
}

#[test]
fn validate_reports_errors_with_nonzero_exit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_fixture(&dir, "schema.json", &sample_schema());
    let values = write_fixture(&dir, "values.json", &json!({ "name": "", "age": "abc" }));

    Command::cargo_bin("dynform")
        .expect("binary")
        .arg("validate")
        .arg("--schema")
        .arg(&schema)
        .arg("--values")
        .arg(&values)
        .assert()
        .failure();
}

#[test]
fn validate_accepts_a_clean_value_map() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_fixture(&dir, "schema.json", &sample_schema());
    let values = write_fixture(&dir, "values.json", &json!({ "name": "Amina", "age": 40 }));

    Command::cargo_bin("dynform")
        .expect("binary")
        .arg("validate")
        .arg("--schema")
        .arg(&schema)
        .arg("--values")
        .arg(&values)
        .assert()
        .success();
}

#[test]
fn inspect_emits_the_json_view() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_fixture(&dir, "schema.json", &sample_schema());

    let output = Command::cargo_bin("dynform")
        .expect("binary")
        .arg("inspect")
        .arg("--schema")
        .arg(&schema)
        .arg("--format")
        .arg("json")
        .output()
        .expect("run inspect");
    assert!(output.status.success());

    let view: Value = serde_json::from_slice(&output.stdout).expect("json view");
    assert_eq!(view["form_id"], "visit");
    assert_eq!(view["status"], "editing");
    assert_eq!(view["sections"][0]["fields"][0]["id"], "name");
}

#[test]
fn schema_subcommand_lists_required_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_fixture(&dir, "schema.json", &sample_schema());

    let output = Command::cargo_bin("dynform")
        .expect("binary")
        .arg("schema")
        .arg("--schema")
        .arg(&schema)
        .output()
        .expect("run schema");
    assert!(output.status.success());

    let generated: Value = serde_json::from_slice(&output.stdout).expect("json schema");
    assert!(generated["properties"]["age"].is_object());
    let required = generated["required"].as_array().expect("required array");
    assert!(required.iter().any(|value| value.as_str() == Some("name")));
}
