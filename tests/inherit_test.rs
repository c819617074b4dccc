use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use strata::error::Error;
use strata::inherit::{parse_inherit_marker, resolve};
use strata::lookup::TemplateLookup;
use tempfile::TempDir;

/// Lookup over a fixed name -> path mapping.
struct MapLookup {
    templates: HashMap<String, PathBuf>,
}

impl MapLookup {
    fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    fn insert(&mut self, name: &str, path: &Path) {
        self.templates.insert(name.to_string(), path.to_path_buf());
    }
}

impl TemplateLookup for MapLookup {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        self.templates.get(name).cloned()
    }
}

fn make_template(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn add_marker(dir: &Path, name: &str) {
    fs::write(dir.join(format!("<inherit:{name}>")), "").unwrap();
}

#[test]
fn test_parse_inherit_marker() {
    assert_eq!(parse_inherit_marker("<inherit:base>"), Some("base"));
    assert_eq!(parse_inherit_marker("<inherit:my-template>"), Some("my-template"));
    assert_eq!(parse_inherit_marker("<inherit:>"), None);
    assert_eq!(parse_inherit_marker("inherit:base"), None);
    assert_eq!(parse_inherit_marker("readme.md"), None);
}

#[test]
fn test_no_markers_resolves_to_empty_list() {
    let temp_dir = TempDir::new().unwrap();
    let template = make_template(temp_dir.path(), "plain");
    fs::write(template.join("readme.md"), "# hi").unwrap();

    let resolution = resolve(&template, &MapLookup::new()).unwrap();

    assert!(resolution.ancestors.is_empty());
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn test_chain_resolves_deepest_ancestor_first() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_template(temp_dir.path(), "a");
    let b = make_template(temp_dir.path(), "b");
    let c = make_template(temp_dir.path(), "c");
    add_marker(&a, "b");
    add_marker(&b, "c");

    let mut lookup = MapLookup::new();
    lookup.insert("b", &b);
    lookup.insert("c", &c);

    let resolution = resolve(&a, &lookup).unwrap();

    let order: Vec<&Path> =
        resolution.ancestors.iter().map(|anc| anc.from.as_path()).collect();
    assert_eq!(order, vec![c.as_path(), b.as_path()]);
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn test_cycle_includes_ancestor_once_and_warns() {
    let temp_dir = TempDir::new().unwrap();
    let a = make_template(temp_dir.path(), "a");
    let b = make_template(temp_dir.path(), "b");
    add_marker(&a, "b");
    add_marker(&b, "a");

    let mut lookup = MapLookup::new();
    lookup.insert("a", &a);
    lookup.insert("b", &b);

    let resolution = resolve(&a, &lookup).unwrap();

    let order: Vec<&Path> =
        resolution.ancestors.iter().map(|anc| anc.from.as_path()).collect();
    assert_eq!(order, vec![b.as_path()]);
    assert_eq!(resolution.diagnostics.len(), 1);
    assert!(resolution.diagnostics[0].message.contains("cycle"));
}

#[test]
fn test_missing_ancestor_is_skipped_with_diagnostic() {
    let temp_dir = TempDir::new().unwrap();
    let template = make_template(temp_dir.path(), "orphan");
    add_marker(&template, "nowhere");

    let resolution = resolve(&template, &MapLookup::new()).unwrap();

    assert!(resolution.ancestors.is_empty());
    assert_eq!(resolution.diagnostics.len(), 1);
    assert!(resolution.diagnostics[0].message.contains("nowhere"));
}

#[test]
fn test_nested_marker_anchors_at_subdirectory() {
    let temp_dir = TempDir::new().unwrap();
    let template = make_template(temp_dir.path(), "app");
    let base = make_template(temp_dir.path(), "base");
    fs::create_dir_all(template.join("src")).unwrap();
    add_marker(&template.join("src"), "base");

    let mut lookup = MapLookup::new();
    lookup.insert("base", &base);

    let resolution = resolve(&template, &lookup).unwrap();

    assert_eq!(resolution.ancestors.len(), 1);
    assert_eq!(resolution.ancestors[0].from, base);
    assert_eq!(resolution.ancestors[0].anchor, PathBuf::from("src"));
}

#[test]
fn test_sibling_branches_may_share_an_ancestor() {
    let temp_dir = TempDir::new().unwrap();
    let template = make_template(temp_dir.path(), "app");
    let common = make_template(temp_dir.path(), "common");
    fs::create_dir_all(template.join("client")).unwrap();
    fs::create_dir_all(template.join("server")).unwrap();
    add_marker(&template.join("client"), "common");
    add_marker(&template.join("server"), "common");

    let mut lookup = MapLookup::new();
    lookup.insert("common", &common);

    let resolution = resolve(&template, &lookup).unwrap();

    let anchors: Vec<&Path> =
        resolution.ancestors.iter().map(|anc| anc.anchor.as_path()).collect();
    assert_eq!(anchors, vec![Path::new("client"), Path::new("server")]);
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn test_missing_template_dir_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("ghost");

    let err = resolve(&missing, &MapLookup::new()).unwrap_err();

    assert!(matches!(err, Error::SourceNotFound { .. }));
}
