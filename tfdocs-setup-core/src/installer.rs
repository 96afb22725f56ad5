// tfdocs-setup-core/src/installer.rs

//! Installs terraform-docs into the running job.
//!
//! One linear pass: resolve the version, download and extract the archive for
//! this platform, optionally swap in the wrapper, then publish the install
//! directory. The first failure aborts the whole run.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::InstallerConfig;
use crate::errors::SetupError;
use crate::pipeline::Pipeline;
use crate::platform::{ArchiveFormat, Platform};
use crate::release::{resolve_version, ReleaseSource};
use crate::tool_cache::ToolCache;
use crate::wrapper::{CLI_PATH_VAR, REAL_BINARY_NAME, TOOL_NAME};

/// Step output carrying the resolved version.
pub const VERSION_OUTPUT: &str = "terraform_docs_version";

const MATCHERS_JSON: &str = include_str!("../matchers.json");
const MATCHERS_FILE_NAME: &str = "terraform-docs-matchers.json";

/// What a successful installation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallOutcome {
    pub version: String,
    /// Directory added to the search path.
    pub path: PathBuf,
    pub wrapped: bool,
}

/// `<base>/<version>/terraform-docs-<version>-<os>-<arch>.<ext>`
pub fn download_url(base: &str, version: &str, platform: &Platform) -> String {
    format!(
        "{base}/{version}/{tool}-{version}-{os}-{arch}.{ext}",
        base = base.trim_end_matches('/'),
        version = version,
        tool = TOOL_NAME,
        os = platform.os,
        arch = platform.arch,
        ext = platform.extension()
    )
}

pub struct Installer {
    releases: Arc<dyn ReleaseSource>,
    cache: Arc<dyn ToolCache>,
    pipeline: Arc<dyn Pipeline>,
    platform: Platform,
    matcher_dir: PathBuf,
}

impl Installer {
    pub fn new(
        releases: Arc<dyn ReleaseSource>,
        cache: Arc<dyn ToolCache>,
        pipeline: Arc<dyn Pipeline>,
        matcher_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            releases,
            cache,
            pipeline,
            platform: Platform::current(),
            matcher_dir: matcher_dir.into(),
        }
    }

    /// Overrides the detected host platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub async fn run(&self, config: &InstallerConfig) -> Result<InstallOutcome, SetupError> {
        config.endpoints.validate().map_err(SetupError::Config)?;

        let version = resolve_version(&config.version, self.releases.as_ref())
            .await
            .map_err(SetupError::Release)?;

        self.pipeline.debug(&format!(
            "Getting download URL for {} version {}: {} {}",
            TOOL_NAME, version, self.platform.os, self.platform.arch
        ));
        let url = download_url(&config.endpoints.download_base_url, &version, &self.platform);

        let path = self.download_cli(&url).await?;

        if config.wrapper {
            self.install_wrapper(&path, &config.wrapper_bin)
                .map_err(SetupError::Install)?;
        }

        self.pipeline.add_path(&path).map_err(SetupError::Pipeline)?;
        self.register_matcher().map_err(SetupError::Pipeline)?;
        self.pipeline
            .set_output(VERSION_OUTPUT, &version)
            .map_err(SetupError::Pipeline)?;

        info!(version = %version, path = %path.display(), wrapped = config.wrapper, "Installed {}.", TOOL_NAME);
        self.pipeline
            .info(&format!("{} {} installed to {}", TOOL_NAME, version, path.display()));
        Ok(InstallOutcome {
            version,
            path,
            wrapped: config.wrapper,
        })
    }

    async fn download_cli(&self, url: &str) -> Result<PathBuf, SetupError> {
        self.pipeline
            .debug(&format!("Downloading {} CLI from {}", TOOL_NAME, url));
        let archive = self
            .cache
            .download_tool(url)
            .await
            .map_err(SetupError::Download)?;

        self.pipeline
            .debug(&format!("Extracting {} CLI archive", TOOL_NAME));
        let extracted = match self.platform.archive_format() {
            ArchiveFormat::Zip => self.cache.extract_zip(&archive).await,
            ArchiveFormat::TarGz => self.cache.extract_tar(&archive).await,
        }
        .map_err(SetupError::Extract)?;

        if archive.as_os_str().is_empty() || extracted.as_os_str().is_empty() {
            return Err(SetupError::Download(anyhow!(
                "Unable to download {} from {}",
                TOOL_NAME,
                url
            )));
        }
        self.pipeline
            .debug(&format!("{} CLI path is {}.", TOOL_NAME, extracted.display()));
        Ok(extracted)
    }

    /// Moves the real binary aside and puts the wrapper in its place.
    fn install_wrapper(&self, cli_dir: &Path, wrapper_bin: &Path) -> Result<()> {
        let binary = cli_dir.join(self.platform.binary_file_name(TOOL_NAME));
        let renamed = cli_dir.join(self.platform.binary_file_name(REAL_BINARY_NAME));

        self.pipeline
            .debug(&format!("Moving {} to {}.", binary.display(), renamed.display()));
        if let Err(e) = fs::rename(&binary, &renamed) {
            self.pipeline.error(&format!(
                "Unable to move {} to {}.",
                binary.display(),
                renamed.display()
            ));
            return Err(e).with_context(|| format!("Failed to move {}", binary.display()));
        }

        self.pipeline
            .debug(&format!("Copying {} to {}.", wrapper_bin.display(), binary.display()));
        if let Err(e) = fs::copy(wrapper_bin, &binary) {
            self.pipeline.error(&format!(
                "Unable to copy {} to {}.",
                wrapper_bin.display(),
                binary.display()
            ));
            return Err(e).with_context(|| format!("Failed to copy {}", wrapper_bin.display()));
        }
        make_executable(&binary)?;

        self.pipeline
            .export_variable(CLI_PATH_VAR, &cli_dir.to_string_lossy())?;
        debug!(cli_dir = %cli_dir.display(), "Installed wrapper.");
        Ok(())
    }

    fn register_matcher(&self) -> Result<()> {
        fs::create_dir_all(&self.matcher_dir).with_context(|| {
            format!("Failed to create matcher directory {}", self.matcher_dir.display())
        })?;
        let matcher_file = self.matcher_dir.join(MATCHERS_FILE_NAME);
        fs::write(&matcher_file, MATCHERS_JSON)
            .with_context(|| format!("Failed to write {}", matcher_file.display()))?;
        self.pipeline.add_matcher(&matcher_file);
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
