use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const SCHEMA: &str = r#"
name: blog
resources:
  - type: article
    options:
      blacklist: [updated]
      relationships:
        author:
          type: people
      top_level_links:
        self: /articles
  - type: people
  - type: tag
"#;

/// Creates a project directory holding the blog schema and a data file
fn setup_project(data: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hyperweave.yaml"), SCHEMA).unwrap();
    std::fs::write(dir.path().join("data.json"), data).unwrap();
    dir
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn test_validate_lists_resources() {
    let dir = setup_project("{}");

    cargo_bin_cmd!("hyperweave")
        .args(["--config", dir.path().to_str().unwrap(), "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("article/default"))
        .stdout(predicate::str::contains("people/default"))
        .stdout(predicate::str::contains("tag/default"));
}

#[test]
fn test_validate_rejects_bad_options() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("hyperweave.yaml"),
        "resources:\n  - type: article\n    options:\n      whitelist: 5\n",
    )
    .unwrap();

    cargo_bin_cmd!("hyperweave")
        .args(["--config", dir.path().to_str().unwrap(), "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("whitelist"));
}

#[test]
fn test_serialize_and_deserialize_round_trip() {
    let dir = setup_project(
        r#"[
            {"id": 1, "title": "Hello", "updated": "x", "author": {"id": 7, "name": "Ada"}},
            {"id": 2, "title": "Again", "author": {"id": 7, "name": "Ada"}}
        ]"#,
    );
    let config = dir.path().to_str().unwrap();
    let data = dir.path().join("data.json");

    let output = cargo_bin_cmd!("hyperweave")
        .args(["--config", config, "serialize", data.to_str().unwrap()])
        .args(["--type", "article", "--extra", r#"{"page": 1}"#])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc = stdout_json(&output.stdout);
    assert_eq!(doc["jsonapi"]["version"], "1.0");
    assert_eq!(doc["links"]["self"], "/articles");
    assert_eq!(doc["data"].as_array().unwrap().len(), 2);
    assert!(doc["data"][0]["attributes"].get("updated").is_none());
    assert_eq!(doc["included"].as_array().unwrap().len(), 1);

    let doc_path = dir.path().join("doc.json");
    std::fs::write(&doc_path, &output.stdout).unwrap();

    let output = cargo_bin_cmd!("hyperweave")
        .args(["--config", config, "deserialize", doc_path.to_str().unwrap()])
        .args(["--type", "article"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = stdout_json(&output.stdout);
    assert_eq!(records[0]["id"], "1");
    assert_eq!(records[0]["title"], "Hello");
    assert_eq!(records[1]["author"]["name"], "Ada");
}

#[test]
fn test_serialize_by_type_field() {
    let dir = setup_project(r#"[{"id": 1, "kind": "tag", "label": "rust"}]"#);

    cargo_bin_cmd!("hyperweave")
        .args(["--config", dir.path().to_str().unwrap(), "serialize"])
        .arg(dir.path().join("data.json"))
        .args(["--type-field", "kind"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "tag""#));
}

#[test]
fn test_serialize_from_stdin() {
    let dir = setup_project("{}");

    cargo_bin_cmd!("hyperweave")
        .args(["--config", dir.path().to_str().unwrap(), "serialize", "-"])
        .args(["--type", "people"])
        .write_stdin(r#"{"id": 3, "name": "Bo"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "Bo""#));
}

#[test]
fn test_serialize_unknown_type_fails() {
    let dir = setup_project("[]");

    cargo_bin_cmd!("hyperweave")
        .args(["--config", dir.path().to_str().unwrap(), "serialize"])
        .arg(dir.path().join("data.json"))
        .args(["--type", "comment"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("comment"));
}

#[test]
fn test_type_selection_is_required() {
    let dir = setup_project("[]");

    cargo_bin_cmd!("hyperweave")
        .args(["--config", dir.path().to_str().unwrap(), "serialize"])
        .arg(dir.path().join("data.json"))
        .assert()
        .failure();
}

#[test]
fn test_missing_schema_file() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("hyperweave")
        .args(["--config", dir.path().to_str().unwrap(), "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load schema file"));
}
