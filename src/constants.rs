//! Common constants used throughout the strata crate.

/// Package descriptor file name.
pub const PACKAGE_DESCRIPTOR: &str = "package.json";

/// Marker file whose content is a shell command executed once after its
/// directory is materialized, then removed.
pub const PREPARE_COMMAND_FILE: &str = ".prepare";

/// Directory names never copied out of a template.
pub const ALWAYS_SKIPPED_DIRS: [&str; 2] = ["node_modules", "dist"];

/// Version substrings that disable caret-prefixing of `workspace:*` rewrites.
pub const PRERELEASE_TAGS: [&str; 5] = ["alpha", "beta", "rc", "canary", "nightly"];
