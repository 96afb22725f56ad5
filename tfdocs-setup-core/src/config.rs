// tfdocs-setup-core/src/config.rs

//! Handles configuration structures and parsing for the installer.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str =
    "https://github.com/terraform-docs/terraform-docs/releases/download";
pub const DEFAULT_OWNER: &str = "terraform-docs";
pub const DEFAULT_REPO: &str = "terraform-docs";

/// Sentinel version meaning "query the release API".
pub const LATEST: &str = "latest";

/// Where releases are looked up and downloaded from.
///
/// Every field is optional in TOML; missing keys fall back to the public
/// terraform-docs project on GitHub.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EndpointsConfig {
    pub api_base_url: String,
    pub download_base_url: String,
    pub owner: String,
    pub repo: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
        }
    }
}

impl EndpointsConfig {
    pub fn from_toml_str(config_toml_content: &str) -> Result<EndpointsConfig> {
        let config: EndpointsConfig = match toml::from_str(config_toml_content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse endpoints TOML content");
                return Err(anyhow!(e))
                    .context("Failed to parse endpoints configuration TOML. Check TOML syntax.");
            }
        };
        config.validate()?;
        tracing::debug!(?config, "Parsed and validated endpoints configuration.");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("api_base_url", &self.api_base_url),
            ("download_base_url", &self.download_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("'{}' in endpoints config is empty.", key));
            }
            Url::parse(value)
                .with_context(|| format!("Invalid URL format for '{}' ('{}').", key, value))?;
        }
        if self.owner.trim().is_empty() {
            return Err(anyhow!("'owner' in endpoints config is empty."));
        }
        if self.repo.trim().is_empty() {
            return Err(anyhow!("'repo' in endpoints config is empty."));
        }
        Ok(())
    }
}

/// Inputs for a single installation run.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Requested version; empty or [`LATEST`] triggers a release query.
    pub version: String,
    /// Replace the real binary with the output-capturing wrapper.
    pub wrapper: bool,
    /// Token for the release query, if any.
    pub github_token: Option<String>,
    /// The wrapper executable copied over the real binary in wrapper mode.
    pub wrapper_bin: PathBuf,
    pub endpoints: EndpointsConfig,
}

pub fn is_latest(version: &str) -> bool {
    let trimmed = version.trim();
    trimmed.is_empty() || trimmed == LATEST
}
