//! Package descriptor merge and patch rules.
//!
//! A descriptor is read when the copy encounters it, merged or patched,
//! and written back immediately; it is never held beyond a single step.

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::constants::PRERELEASE_TAGS;
use crate::error::{Error, Result};
use crate::step::VersionSpec;

/// Top-level fields whose entries are deep-merged and alphabetically
/// sorted in the output.
const SORTED_MAP_FIELDS: [&str; 3] = ["scripts", "dependencies", "devDependencies"];

/// Dependency sections a per-dependency version override may touch.
const DEPENDENCY_FIELDS: [&str; 2] = ["dependencies", "devDependencies"];

/// Merges an incoming descriptor into an existing one.
///
/// Shallow merge, incoming top-level keys winning, with two exceptions:
/// `name` is kept from whichever side already had a non-empty value
/// (existing side preferred), and the [`SORTED_MAP_FIELDS`] are merged
/// per key with their keys alphabetically sorted in the output.
pub fn merge_descriptors(existing: Value, incoming: Value, path: &Path) -> Result<Value> {
    let mut merged = as_object(existing, path)?;
    let incoming = as_object(incoming, path)?;

    for (key, value) in incoming {
        if key == "name" {
            let existing_name =
                merged.get("name").and_then(Value::as_str).unwrap_or_default();
            if existing_name.is_empty() {
                merged.insert(key, value);
            }
        } else if SORTED_MAP_FIELDS.contains(&key.as_str()) {
            let combined = merge_sorted_map(merged.get(&key).cloned(), value, &key, path)?;
            merged.insert(key, combined);
        } else {
            merged.insert(key, value);
        }
    }

    // Sections only the existing side carried still come out sorted.
    for field in SORTED_MAP_FIELDS {
        if let Some(value) = merged.get(field).cloned() {
            merged.insert(field.to_string(), merge_sorted_map(None, value, field, path)?);
        }
    }

    Ok(Value::Object(merged))
}

/// Applies the post-copy patch rules to a descriptor copied verbatim:
/// `workspace:*` rewriting for a single version, exact entry overwrites
/// for a per-dependency version map, and the package name.
pub fn patch_descriptor(
    dest: &Path,
    version: Option<&VersionSpec>,
    package_name: Option<&str>,
) -> Result<()> {
    let mut text = fs::read_to_string(dest).map_err(|e| Error::file_system(dest, e))?;

    if let Some(VersionSpec::Exact(version)) = version {
        text = text.replace("workspace:*", &workspace_replacement(version));
    }

    let rename = package_name.filter(|name| *name != ".");
    let overrides = match version {
        Some(VersionSpec::Dependencies(map)) => Some(map),
        _ => None,
    };

    if rename.is_some() || overrides.is_some() {
        let mut doc: Value =
            serde_json::from_str(&text).map_err(|e| Error::merge(dest, e.to_string()))?;
        let Value::Object(map) = &mut doc else {
            return Err(Error::merge(dest, "descriptor is not a JSON object"));
        };
        if let Some(overrides) = overrides {
            for field in DEPENDENCY_FIELDS {
                let Some(Value::Object(deps)) = map.get_mut(field) else {
                    continue;
                };
                for (dependency, version) in overrides {
                    if deps.contains_key(dependency) {
                        deps.insert(dependency.clone(), Value::String(version.clone()));
                    }
                }
            }
        }
        if let Some(name) = rename {
            map.insert("name".to_string(), Value::String(name.to_string()));
        }
        text = to_pretty(&doc, dest)?;
    }

    fs::write(dest, text).map_err(|e| Error::file_system(dest, e))
}

/// Serializes a descriptor with a trailing newline.
pub fn to_pretty(doc: &Value, path: &Path) -> Result<String> {
    let mut text =
        serde_json::to_string_pretty(doc).map_err(|e| Error::merge(path, e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// `workspace:*` becomes `^version`, unless the version carries a
/// pre-release tag, in which case the raw version is pinned.
fn workspace_replacement(version: &str) -> String {
    if PRERELEASE_TAGS.iter().any(|tag| version.contains(tag)) {
        version.to_string()
    } else {
        format!("^{version}")
    }
}

fn as_object(value: Value, path: &Path) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::merge(path, "descriptor is not a JSON object")),
    }
}

/// Overlays `incoming` entries onto `base` (incoming wins per key) and
/// returns the union with alphabetically sorted keys.
fn merge_sorted_map(
    base: Option<Value>,
    incoming: Value,
    field: &str,
    path: &Path,
) -> Result<Value> {
    let mut combined = match base {
        Some(value) => as_field_object(value, field, path)?,
        None => Map::new(),
    };
    combined.extend(as_field_object(incoming, field, path)?);

    let mut entries: Vec<(String, Value)> = combined.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(Value::Object(entries.into_iter().collect()))
}

fn as_field_object(value: Value, field: &str, path: &Path) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::merge(path, format!("'{field}' is not an object"))),
    }
}
