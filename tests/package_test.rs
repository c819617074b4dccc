use indexmap::IndexMap;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use strata::error::Error;
use strata::package::{merge_descriptors, patch_descriptor};
use strata::step::VersionSpec;
use tempfile::TempDir;

fn descriptor_path() -> &'static Path {
    Path::new("package.json")
}

fn keys(value: &Value) -> Vec<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

#[test]
fn test_merge_unions_dependencies_sorted() {
    let existing = json!({ "dependencies": { "a": "1" } });
    let incoming = json!({ "dependencies": { "b": "2" } });

    let merged = merge_descriptors(existing, incoming, descriptor_path()).unwrap();

    assert_eq!(merged["dependencies"], json!({ "a": "1", "b": "2" }));
    assert_eq!(keys(&merged["dependencies"]), vec!["a", "b"]);
}

#[test]
fn test_merge_sorts_keys_alphabetically() {
    let existing = json!({ "scripts": { "start": "node ." } });
    let incoming = json!({ "scripts": { "build": "tsc", "lint": "eslint ." } });

    let merged = merge_descriptors(existing, incoming, descriptor_path()).unwrap();

    assert_eq!(keys(&merged["scripts"]), vec!["build", "lint", "start"]);
}

#[test]
fn test_merge_incoming_wins_per_key() {
    let existing = json!({ "version": "1.0.0", "scripts": { "start": "old" } });
    let incoming = json!({ "version": "2.0.0", "scripts": { "start": "new" } });

    let merged = merge_descriptors(existing, incoming, descriptor_path()).unwrap();

    assert_eq!(merged["version"], json!("2.0.0"));
    assert_eq!(merged["scripts"]["start"], json!("new"));
}

#[test]
fn test_merge_keeps_existing_non_empty_name() {
    let existing = json!({ "name": "my-app" });
    let incoming = json!({ "name": "template" });

    let merged = merge_descriptors(existing, incoming, descriptor_path()).unwrap();

    assert_eq!(merged["name"], json!("my-app"));
}

#[test]
fn test_merge_takes_incoming_name_when_existing_is_empty() {
    let existing = json!({ "name": "" });
    let incoming = json!({ "name": "template" });

    let merged = merge_descriptors(existing, incoming, descriptor_path()).unwrap();

    assert_eq!(merged["name"], json!("template"));
}

#[test]
fn test_merge_rejects_non_object_descriptor() {
    let err = merge_descriptors(json!([]), json!({}), descriptor_path()).unwrap_err();

    assert!(matches!(err, Error::Merge { .. }));
}

#[test]
fn test_patch_rewrites_workspace_versions_with_caret() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("package.json");
    fs::write(&dest, r#"{ "dependencies": { "lib": "workspace:*" } }"#).unwrap();

    let version = VersionSpec::Exact("1.2.3".to_string());
    patch_descriptor(&dest, Some(&version), None).unwrap();

    let content = fs::read_to_string(&dest).unwrap();
    assert!(content.contains("\"^1.2.3\""));
    assert!(!content.contains("workspace:*"));
}

#[test]
fn test_patch_pins_prerelease_versions_without_caret() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("package.json");
    fs::write(&dest, r#"{ "dependencies": { "lib": "workspace:*" } }"#).unwrap();

    let version = VersionSpec::Exact("1.2.3-beta.4".to_string());
    patch_descriptor(&dest, Some(&version), None).unwrap();

    let content = fs::read_to_string(&dest).unwrap();
    assert!(content.contains("\"1.2.3-beta.4\""));
    assert!(!content.contains("^1.2.3-beta.4"));
}

#[test]
fn test_patch_overwrites_only_matching_dependency_entries() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("package.json");
    fs::write(
        &dest,
        r#"{
  "dependencies": { "foo": "workspace:*", "bar": "1.0.0" },
  "devDependencies": { "baz": "0.1.0" }
}"#,
    )
    .unwrap();

    let mut overrides = IndexMap::new();
    overrides.insert("foo".to_string(), "2.0.0".to_string());
    overrides.insert("baz".to_string(), "3.0.0".to_string());
    overrides.insert("missing".to_string(), "9.9.9".to_string());
    let version = VersionSpec::Dependencies(overrides);

    patch_descriptor(&dest, Some(&version), None).unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
    assert_eq!(doc["dependencies"]["foo"], json!("2.0.0"));
    assert_eq!(doc["dependencies"]["bar"], json!("1.0.0"));
    assert_eq!(doc["devDependencies"]["baz"], json!("3.0.0"));
    assert!(doc["dependencies"].get("missing").is_none());
    assert!(doc["devDependencies"].get("missing").is_none());
}

#[test]
fn test_patch_sets_package_name() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("package.json");
    fs::write(&dest, r#"{ "name": "template" }"#).unwrap();

    patch_descriptor(&dest, None, Some("my-app")).unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
    assert_eq!(doc["name"], json!("my-app"));
}

#[test]
fn test_patch_dot_package_name_leaves_name_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("package.json");
    fs::write(&dest, r#"{ "name": "template" }"#).unwrap();

    patch_descriptor(&dest, None, Some(".")).unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
    assert_eq!(doc["name"], json!("template"));
}

#[test]
fn test_patch_rejects_malformed_descriptor() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("package.json");
    fs::write(&dest, "{ not json").unwrap();

    let err = patch_descriptor(&dest, None, Some("my-app")).unwrap_err();

    assert!(matches!(err, Error::Merge { .. }));
}
