//! Command-line interface implementation for strata.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Command-line arguments structure for strata.
#[derive(Parser, Debug)]
#[command(author, version, about = "strata: project scaffolding from composable, inheritable templates", long_about = None)]
pub struct Args {
    /// Path to the template directory
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Directory ancestor template names are resolved against.
    /// Defaults to the template's parent directory.
    #[arg(long, value_name = "DIR")]
    pub templates_root: Option<PathBuf>,

    /// Template variable as key=value; the value parses as a JSON scalar
    /// and falls back to a plain string. May be repeated.
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub variables: Vec<String>,

    /// Read a variables JSON object from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Package name written into generated package descriptors
    #[arg(long, value_name = "NAME")]
    pub package_name: Option<String>,

    /// Version used to rewrite `workspace:*` dependency entries
    #[arg(long, value_name = "VERSION")]
    pub pkg_version: Option<String>,

    /// Continue into a non-empty output directory without asking
    #[arg(short, long)]
    pub force: bool,

    /// Skip the output directory emptiness check entirely
    #[arg(long)]
    pub skip_empty_check: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Splits a `key=value` variable argument. The value parses as a JSON
/// scalar, so `count=3` and `flag=true` become a number and a boolean;
/// anything unparseable stays a plain string.
pub fn parse_variable(raw: &str) -> Result<(String, serde_json::Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(Error::Configuration(format!(
            "invalid variable '{raw}', expected key=value"
        )));
    };
    let parsed = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                    .unwrap();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
