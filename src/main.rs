//! strata's main application entry point.
//! Wires the parsed command line to a single-step pipeline with the
//! production collaborators: directory-based template lookup, dialoguer
//! prompts and the system shell.

use std::io::Read;
use std::path::{Path, PathBuf};

use strata::{
    cli::{get_args, parse_variable, Args},
    error::{default_error_handler, Error, Result},
    lookup::DirectoryLookup,
    pipeline::Pipeline,
    prompt::DialoguerPrompter,
    shell::SystemShell,
    step::{BuildConfig, Step, VersionSpec},
    substitute::Variables,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Collects variables from stdin (when requested) and from repeated
/// `--var` arguments; the latter win on key collisions.
fn collect_variables(args: &Args) -> Result<Variables> {
    let mut variables = Variables::new();

    if args.stdin {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        let preloaded: Variables = serde_json::from_str(buffer.trim()).map_err(|e| {
            Error::Configuration(format!("invalid variables JSON on stdin: {e}"))
        })?;
        variables.extend(preloaded);
    }

    for raw in &args.variables {
        let (key, value) = parse_variable(raw)?;
        variables.insert(key, value);
    }
    Ok(variables)
}

fn run(args: Args) -> Result<()> {
    let variables = collect_variables(&args)?;

    let templates_root = args.templates_root.clone().unwrap_or_else(|| {
        args.template
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let lookup = DirectoryLookup::new(templates_root);
    let prompter = DialoguerPrompter::new();
    let shell = SystemShell::new();

    let mut config = BuildConfig::new(&args.output_dir);
    config.package_name = args.package_name.clone();
    config.version = args.pkg_version.clone().map(VersionSpec::Exact);
    config.overwrite = args.force;
    if args.skip_empty_check {
        config.check_empty = Some(false);
    }

    let mut pipeline = Pipeline::new(
        "scaffold",
        format!("Generate a project into {}", args.output_dir.display()),
        config,
        &lookup,
        &prompter,
        &shell,
    );
    pipeline.add_step(Step::from_template(&args.template).with_variables(variables))?;
    pipeline.mark_crucial(&args.output_dir);
    pipeline.build()?;

    println!("Project generated successfully in {}.", args.output_dir.display());
    Ok(())
}
