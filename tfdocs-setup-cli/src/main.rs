// tfdocs-setup-cli/src/main.rs
mod cli;

use anyhow::{anyhow, Context, Result};
use colored::*;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use reqwest::Client;
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tfdocs_setup_core::{
    tool_cache::default_temp_root, EndpointsConfig, GithubActions, GithubReleases, HttpToolCache,
    InstallOutcome, Installer, InstallerConfig, Pipeline, Platform, SetupError,
};

use crate::cli::Cli;

const WRAPPER_BIN_NAME: &str = "terraform-docs-wrapper";

fn init_logging(verbose: u8) -> Result<Level> {
    let default_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    // stdout belongs to the runner's workflow commands, so logs go to stderr.
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
    Ok(default_level)
}

fn load_endpoints(config_path: Option<&Path>) -> Result<EndpointsConfig> {
    let Some(path) = config_path else {
        return Ok(EndpointsConfig::default());
    };
    info!("Loading endpoints configuration from: {:?}", path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read endpoints config file: {:?}", path))?;
    let endpoints = EndpointsConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse or validate endpoints configuration {:?}", path))
        .map_err(SetupError::Config)?;
    Ok(endpoints)
}

/// The wrapper binary shipped alongside this installer.
fn default_wrapper_bin() -> Result<PathBuf> {
    let exe = env::current_exe().context("Failed to determine installer executable path")?;
    let dir = exe
        .parent()
        .ok_or_else(|| anyhow!("Installer executable has no parent directory"))?;
    Ok(dir.join(Platform::current().binary_file_name(WRAPPER_BIN_NAME)))
}

fn build_config(cli: Cli) -> Result<InstallerConfig> {
    let endpoints = load_endpoints(cli.config.as_deref())?;
    let wrapper_bin = match cli.wrapper_bin {
        Some(path) => path,
        None => default_wrapper_bin()?,
    };
    Ok(InstallerConfig {
        version: cli.terraform_docs_version,
        wrapper: cli.wrapper,
        github_token: cli.github_token,
        wrapper_bin,
        endpoints,
    })
}

async fn run(cli: Cli, pipeline: Arc<dyn Pipeline>) -> Result<InstallOutcome> {
    let config = build_config(cli)?;
    debug!(version = %config.version, wrapper = config.wrapper, "Installer inputs resolved.");

    let client = reqwest_client()?;
    let temp_root = default_temp_root();
    let installer = Installer::new(
        Arc::new(GithubReleases::new(
            client.clone(),
            &config.endpoints,
            config.github_token.clone(),
        )),
        Arc::new(HttpToolCache::new(client, temp_root.clone())),
        pipeline,
        temp_root,
    );
    Ok(installer.run(&config).await?)
}

fn reqwest_client() -> Result<Client> {
    Client::builder()
        .build()
        .context("Failed to build HTTP client for installer")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Ensure colored output is enabled for early errors
    colored::control::set_override(true);

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = match init_logging(cli.verbose) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    colored::control::unset_override();
    debug!(
        "Logging initialized. Level determined by RUST_LOG or -v flags (default: {}).",
        default_level
    );

    let actions = Arc::new(GithubActions::from_env());
    match run(cli, actions.clone()).await {
        Ok(outcome) => {
            info!(
                version = %outcome.version,
                path = %outcome.path.display(),
                wrapped = outcome.wrapped,
                "terraform-docs is ready."
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "Installation failed.");
            actions.set_failed(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
