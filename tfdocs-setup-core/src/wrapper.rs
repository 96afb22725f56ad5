// tfdocs-setup-core/src/wrapper.rs

//! The output-capturing shim that stands in for `terraform-docs`.
//!
//! The installer renames the real binary to `terraform-docs-bin` and puts the
//! shim in its place. At run time the shim finds the real binary through
//! `TFDOCS_CLI_PATH`, runs it with the forwarded arguments, and republishes
//! stdout, stderr and the exit code as step outputs.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::SetupError;
use crate::pipeline::Pipeline;
use crate::platform::Platform;

/// Variable the installer exports so the shim can find the real binary.
pub const CLI_PATH_VAR: &str = "TFDOCS_CLI_PATH";
pub const TOOL_NAME: &str = "terraform-docs";
pub const REAL_BINARY_NAME: &str = "terraform-docs-bin";

/// Exit code terraform-docs uses for "ran fine, but found issues".
const ISSUES_FOUND_EXIT: i32 = 2;

/// Represents the structured output of an executed external command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// The exit status code of the command, or -1 if killed by a signal.
    pub status: i32,
    /// The captured standard output as a string.
    pub stdout: String,
    /// The captured standard error as a string.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        is_success_exit(self.status)
    }
}

/// 0 is success and 2 means issues were flagged; neither fails the step.
pub fn is_success_exit(code: i32) -> bool {
    code == 0 || code == ISSUES_FOUND_EXIT
}

/// Where the real binary lives: `$TFDOCS_CLI_PATH`, else next to the shim.
pub fn real_binary_path(cli_dir: Option<&Path>, shim_exe: &Path, platform: &Platform) -> Result<PathBuf> {
    let dir = match cli_dir {
        Some(dir) => dir.to_path_buf(),
        None => shim_exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("Cannot determine directory of {}", shim_exe.display()))?,
    };
    Ok(dir.join(platform.binary_file_name(REAL_BINARY_NAME)))
}

/// Resolves the real binary for the running shim from the process environment.
pub fn locate_real_binary() -> Result<PathBuf, SetupError> {
    let cli_dir = env::var_os(CLI_PATH_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    if cli_dir.is_none() {
        warn!("{} is not set, looking next to the wrapper executable.", CLI_PATH_VAR);
    }
    let shim_exe = env::current_exe()
        .context("Failed to determine wrapper executable path")
        .map_err(SetupError::Exec)?;
    real_binary_path(cli_dir.as_deref(), &shim_exe, &Platform::current()).map_err(SetupError::Exec)
}

/// Fails unless `path` names an existing file.
pub fn check_binary(path: &Path) -> Result<(), SetupError> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Unable to locate executable file: {}", path.display()))
        .map_err(SetupError::Exec)?;
    if !metadata.is_file() {
        return Err(SetupError::Exec(anyhow!(
            "Unable to locate executable file: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Runs `binary` with `args`, capturing both streams; a non-zero exit is not an error.
pub async fn execute_binary(binary: &Path, args: Vec<OsString>) -> Result<CommandOutput, SetupError> {
    run_captured(binary, args).await.map_err(SetupError::Exec)
}

async fn run_captured(binary: &Path, args: Vec<OsString>) -> Result<CommandOutput> {
    debug!(binary = %binary.display(), ?args, "Executing wrapped binary.");
    let binary_owned = binary.to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        duct::cmd(binary_owned, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked() // Don't fail on non-zero exit status
            .run()
    })
    .await
    .context("Wrapped process task panicked")?
    .with_context(|| format!("Failed to spawn process for {}", binary.display()))?;

    let status = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    debug!(
        status,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "Wrapped binary finished."
    );

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

/// Publishes `stdout`, `stderr` and `exitcode`, failing the step unless the
/// exit code is 0 or 2. Returns whether the step succeeded.
pub fn publish_outputs(output: &CommandOutput, pipeline: &dyn Pipeline) -> Result<bool, SetupError> {
    pipeline.debug(&format!("{} exited with code {}.", TOOL_NAME, output.status));
    pipeline.debug(&format!("stdout: {}", output.stdout));
    pipeline.debug(&format!("stderr: {}", output.stderr));
    pipeline.debug(&format!("exitcode: {}", output.status));

    pipeline
        .set_output("stdout", &output.stdout)
        .map_err(SetupError::Pipeline)?;
    pipeline
        .set_output("stderr", &output.stderr)
        .map_err(SetupError::Pipeline)?;
    pipeline
        .set_output("exitcode", &output.status.to_string())
        .map_err(SetupError::Pipeline)?;

    if output.success() {
        return Ok(true);
    }
    pipeline.set_failed(&format!("{} exited with code {}.", TOOL_NAME, output.status));
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PipelineCall, RecordingPipeline};

    fn output(status: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            status,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_success_exit_codes() {
        assert!(is_success_exit(0));
        assert!(is_success_exit(2));
        assert!(!is_success_exit(1));
        assert!(!is_success_exit(3));
        assert!(!is_success_exit(-1));
    }

    #[test]
    fn test_real_binary_path_from_cli_dir() {
        let platform = Platform::new("linux", "x64");
        let path = real_binary_path(
            Some(Path::new("/opt/tfdocs")),
            Path::new("/usr/bin/terraform-docs"),
            &platform,
        )
        .unwrap();
        assert_eq!(path, Path::new("/opt/tfdocs").join("terraform-docs-bin"));
    }

    #[test]
    fn test_real_binary_path_next_to_shim() {
        let platform = Platform::new("win32", "x64");
        let path = real_binary_path(None, Path::new("/tools/tfdocs/terraform-docs.exe"), &platform)
            .unwrap();
        assert_eq!(path, Path::new("/tools/tfdocs").join("terraform-docs-bin.exe"));
    }

    #[test]
    fn test_check_binary_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = check_binary(&dir.path().join("terraform-docs-bin"));
        assert!(matches!(result, Err(SetupError::Exec(_))), "Unexpected: {:?}", result);
        assert!(result.err().unwrap().to_string().contains("Unable to locate executable file"));
        assert!(matches!(check_binary(dir.path()), Err(SetupError::Exec(_))));
    }

    #[test]
    fn test_publish_success() {
        let pipeline = RecordingPipeline::new();
        let ok = publish_outputs(&output(0, "# Inputs\n", ""), &pipeline).unwrap();
        assert!(ok);
        assert!(!pipeline.failed());
        assert_eq!(pipeline.output("stdout").as_deref(), Some("# Inputs\n"));
        assert_eq!(pipeline.output("stderr").as_deref(), Some(""));
        assert_eq!(pipeline.output("exitcode").as_deref(), Some("0"));
    }

    #[test]
    fn test_publish_issues_found_is_not_failure() {
        let pipeline = RecordingPipeline::new();
        let ok = publish_outputs(&output(2, "", "drift detected"), &pipeline).unwrap();
        assert!(ok);
        assert!(!pipeline.failed());
        assert_eq!(pipeline.output("exitcode").as_deref(), Some("2"));
    }

    #[test]
    fn test_publish_failure_marks_step_failed() {
        let pipeline = RecordingPipeline::new();
        let ok = publish_outputs(&output(1, "", "boom"), &pipeline).unwrap();
        assert!(!ok);
        let failures: Vec<PipelineCall> = pipeline
            .calls()
            .into_iter()
            .filter(|c| matches!(c, PipelineCall::SetFailed(_)))
            .collect();
        assert_eq!(
            failures,
            vec![PipelineCall::SetFailed("terraform-docs exited with code 1.".into())]
        );
        assert_eq!(pipeline.output("stderr").as_deref(), Some("boom"));
        assert_eq!(pipeline.output("exitcode").as_deref(), Some("1"));
    }

    #[test]
    fn test_publish_empty_output_still_sets_all_outputs() {
        let pipeline = RecordingPipeline::new();
        publish_outputs(&output(0, "", ""), &pipeline).unwrap();
        assert_eq!(
            pipeline.count(|c| matches!(c, PipelineCall::SetOutput(_, _))),
            3
        );
    }

    #[test]
    fn test_publish_propagates_output_error() {
        let pipeline = RecordingPipeline {
            fail_outputs: true,
            ..Default::default()
        };
        let result = publish_outputs(&output(0, "x", ""), &pipeline);
        assert!(matches!(result, Err(SetupError::Pipeline(_))), "Unexpected: {:?}", result);
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(REAL_BINARY_NAME);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_binary_captures_streams_and_args() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echo \"args: $*\"\necho oops >&2\nexit 2");
        let result = execute_binary(&script, vec!["markdown".into(), "table".into(), ".".into()]).await;
        assert!(result.is_ok(), "Command failed: {:?}", result.err());
        let out = result.unwrap();
        assert_eq!(out.status, 2);
        assert_eq!(out.stdout.trim(), "args: markdown table .");
        assert_eq!(out.stderr.trim(), "oops");
        assert!(out.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_binary_nonzero_is_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "exit 7");
        let out = execute_binary(&script, Vec::new()).await.unwrap();
        assert_eq!(out.status, 7);
        assert!(out.stdout.is_empty());
        assert!(!out.success());
    }

    #[tokio::test]
    async fn test_execute_missing_binary_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute_binary(&dir.path().join("nope"), Vec::new()).await;
        assert!(matches!(result, Err(SetupError::Exec(_))), "Unexpected: {:?}", result);
        assert!(result.err().unwrap().to_string().contains("Failed to spawn process"));
    }
}
