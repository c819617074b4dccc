//! strata is a project scaffolding engine built around composable,
//! inheritable file-tree templates. A template declares ancestors with
//! `<inherit:NAME>` marker files; the pipeline expands the ancestor chain
//! deepest-first, copies every layer with `{{key}}` placeholder
//! substitution and package descriptor merging, then runs post-copy
//! prepare commands.

/// Binary file detection used to guard content substitution
pub mod binary;

/// Command-line interface module for the strata binary
pub mod cli;

/// Common constants: marker names, implicit skip lists, pre-release tags
pub mod constants;

/// Template materialization: copy, skip, rename, substitute, merge
pub mod copy;

/// Structured warnings returned by resolution, copy and merge routines
pub mod diagnostics;

/// Error types and handling for strata
pub mod error;

/// Inheritance marker resolution into ordered ancestor copies
pub mod inherit;

/// Template name lookup for inheritance markers
pub mod lookup;

/// Package descriptor merge and patch rules
pub mod package;

/// Step pipeline orchestration and the external runner surface
pub mod pipeline;

/// User decision handling
pub mod prompt;

/// Shell execution of prepare commands
pub mod shell;

/// Step, build configuration and hook data model
pub mod step;

/// Placeholder substitution for file names and contents
pub mod substitute;
