// tfdocs-setup-core/src/pipeline.rs

//! The pipeline side of the runner protocol: workflow commands on stdout and
//! the `GITHUB_PATH` / `GITHUB_ENV` / `GITHUB_OUTPUT` command files.
//!
//! The installer and the wrapper only talk to the [`Pipeline`] trait, so tests
//! can record calls instead of scraping stdout.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Operations a step can perform against the surrounding pipeline.
pub trait Pipeline: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    /// Prepends `dir` to the search path for this and all later steps.
    fn add_path(&self, dir: &Path) -> Result<()>;
    /// Sets an environment variable for this and all later steps.
    fn export_variable(&self, name: &str, value: &str) -> Result<()>;
    fn set_output(&self, name: &str, value: &str) -> Result<()>;
    /// Registers a problem matcher definition file.
    fn add_matcher(&self, matcher_file: &Path);
    /// Logs `message` as an error and marks the step failed.
    fn set_failed(&self, message: &str);
}

/// GitHub Actions runner implementation of [`Pipeline`].
pub struct GithubActions {
    out: Mutex<Box<dyn Write + Send>>,
    path_file: Option<PathBuf>,
    env_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    update_process_env: bool,
    failed: AtomicBool,
}

impl GithubActions {
    /// Reads the command file locations from the runner environment and
    /// writes workflow commands to stdout.
    pub fn from_env() -> Self {
        let file_var = |name: &str| {
            env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            out: Mutex::new(Box::new(io::stdout())),
            path_file: file_var("GITHUB_PATH"),
            env_file: file_var("GITHUB_ENV"),
            output_file: file_var("GITHUB_OUTPUT"),
            update_process_env: true,
            failed: AtomicBool::new(false),
        }
    }

    /// A runner that writes commands to `out` and command files to the given
    /// paths, leaving this process's environment untouched.
    pub fn with_files(
        out: Box<dyn Write + Send>,
        path_file: Option<PathBuf>,
        env_file: Option<PathBuf>,
        output_file: Option<PathBuf>,
    ) -> Self {
        Self {
            out: Mutex::new(out),
            path_file,
            env_file,
            output_file,
            update_process_env: false,
            failed: AtomicBool::new(false),
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn write_line(&self, line: &str) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!(error = %e, "Failed to write workflow command.");
        }
    }

    fn issue(&self, command: &str, properties: &[(&str, &str)], message: &str) {
        self.write_line(&format_command(command, properties, message));
    }
}

impl Pipeline for GithubActions {
    fn debug(&self, message: &str) {
        debug!("{}", message);
        self.issue("debug", &[], message);
    }

    fn info(&self, message: &str) {
        self.write_line(message);
    }

    fn error(&self, message: &str) {
        self.issue("error", &[], message);
    }

    fn add_path(&self, dir: &Path) -> Result<()> {
        let dir_str = dir.to_string_lossy();
        match &self.path_file {
            Some(file) => append_file_command(file, &format!("{}{}", dir_str, EOL))?,
            None => self.issue("add-path", &[], &dir_str),
        }
        if self.update_process_env {
            let mut paths = vec![dir.to_path_buf()];
            if let Some(existing) = env::var_os("PATH") {
                paths.extend(env::split_paths(&existing));
            }
            let joined: OsString = env::join_paths(paths).context("Failed to join PATH entries")?;
            env::set_var("PATH", joined);
        }
        debug!(dir = %dir.display(), "Added directory to PATH.");
        Ok(())
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<()> {
        match &self.env_file {
            Some(file) => append_file_command(file, &key_value_message(name, value)?)?,
            None => self.issue("set-env", &[("name", name)], value),
        }
        if self.update_process_env {
            env::set_var(name, value);
        }
        debug!(name = %name, "Exported variable.");
        Ok(())
    }

    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        match &self.output_file {
            Some(file) => append_file_command(file, &key_value_message(name, value)?)?,
            None => {
                // Older runners read outputs from stdout; keep a blank line in
                // front so the command starts on its own line.
                self.write_line("");
                self.issue("set-output", &[("name", name)], value);
            }
        }
        Ok(())
    }

    fn add_matcher(&self, matcher_file: &Path) {
        self.issue("add-matcher", &[], &matcher_file.to_string_lossy());
    }

    fn set_failed(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        self.error(message);
    }
}

pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Renders `::command key=value,...::message`.
pub fn format_command(command: &str, properties: &[(&str, &str)], message: &str) -> String {
    let mut line = format!("::{}", command);
    if !properties.is_empty() {
        let rendered: Vec<String> = properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, escape_property(v)))
            .collect();
        line.push(' ');
        line.push_str(&rendered.join(","));
    }
    line.push_str("::");
    line.push_str(&escape_data(message));
    line
}

/// Heredoc-style block understood by `GITHUB_ENV` and `GITHUB_OUTPUT`.
pub fn key_value_message(key: &str, value: &str) -> Result<String> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    if key.contains(&delimiter) {
        return Err(anyhow!(
            "Unexpected input: name should not contain the delimiter \"{}\"",
            delimiter
        ));
    }
    if value.contains(&delimiter) {
        return Err(anyhow!(
            "Unexpected input: value should not contain the delimiter \"{}\"",
            delimiter
        ));
    }
    Ok(format!(
        "{key}<<{delim}{eol}{value}{eol}{delim}{eol}",
        key = key,
        delim = delimiter,
        eol = EOL,
        value = value
    ))
}

fn append_file_command(file: &Path, message: &str) -> Result<()> {
    let mut handle = OpenOptions::new()
        .append(true)
        .open(file)
        .with_context(|| format!("Missing file at path: {}", file.display()))?;
    handle
        .write_all(message.as_bytes())
        .with_context(|| format!("Failed to append to command file {}", file.display()))
}

/// Parses a boolean input the way the runner's YAML 1.2 core schema does.
///
/// The runner exports unset inputs as empty strings, so blank means `false`.
pub fn parse_boolean_input(value: &str) -> Result<bool, String> {
    match value.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "" | "false" | "False" | "FALSE" => Ok(false),
        other => Err(format!(
            "Input does not meet YAML 1.2 \"Core Schema\" specification: '{}'. Support boolean input list: `true | True | TRUE | false | False | FALSE`",
            other
        )),
    }
}
