// tfdocs-wrapper/src/main.rs

//! Installed as `terraform-docs` in wrapper mode. Runs the real binary and
//! republishes what it printed as step outputs.

use anyhow::Result;
use colored::*;
use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tfdocs_setup_core::pipeline::{GithubActions, Pipeline};
use tfdocs_setup_core::wrapper::{
    check_binary, execute_binary, locate_real_binary, publish_outputs, CommandOutput,
};

/// Only `RUST_LOG` turns on logging here; the shim takes no flags of its own.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
}

/// Replays captured output so the step log still shows what the tool printed.
fn echo(output: &CommandOutput) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    let mut stderr = io::stderr().lock();
    stderr.write_all(output.stderr.as_bytes())?;
    stderr.flush()?;
    Ok(())
}

async fn run(pipeline: &dyn Pipeline) -> Result<bool> {
    let binary = locate_real_binary()?;
    // This will fail if terraform-docs-bin isn't there, which is what we want
    check_binary(&binary)?;

    let args: Vec<_> = env::args_os().skip(1).collect();
    let output = execute_binary(&binary, args).await?;
    echo(&output)?;
    Ok(publish_outputs(&output, pipeline)?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let actions = GithubActions::from_env();
    match run(&actions).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            debug!("Wrapped terraform-docs reported a failing exit code.");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = ?e, "Wrapper failed.");
            eprintln!("{} {:#}", "Error:".red(), e);
            actions.set_failed(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
