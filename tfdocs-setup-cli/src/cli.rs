// tfdocs-setup-cli/src/cli.rs
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use tfdocs_setup_core::pipeline::parse_boolean_input;

/// setup-terraform-docs: installs terraform-docs into the current CI job.
///
/// Every option falls back to the runner's `INPUT_*` variable, so the binary
/// can run directly as an action step.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase message verbosity.
    ///
    /// Specify multiple times for more verbose output:
    ///  -v:  INFO level
    ///  -vv: DEBUG level
    ///  -vvv: TRACE level (most verbose)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Version to install, or `latest`.
    #[arg(
        long = "terraform-docs-version",
        env = "INPUT_TERRAFORM_DOCS_VERSION",
        default_value = "latest"
    )]
    pub terraform_docs_version: String,

    /// Replace the binary with a wrapper that captures its output.
    #[arg(
        long,
        env = "INPUT_TERRAFORM_DOCS_WRAPPER",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = parse_boolean_input
    )]
    pub wrapper: bool,

    /// Token used for the latest-release query.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Wrapper executable to install (defaults to the one shipped next to this binary).
    #[arg(long, env = "TFDOCS_WRAPPER_BIN")]
    pub wrapper_bin: Option<PathBuf>,

    /// TOML file overriding the release endpoints.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
