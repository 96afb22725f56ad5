// tfdocs-setup-core/src/release.rs

//! Release lookup against the GitHub REST API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{is_latest, EndpointsConfig};

const USER_AGENT: &str = concat!("setup-terraform-docs/", env!("CARGO_PKG_VERSION"));

/// The subset of a GitHub release payload the installer reads.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
}

impl Release {
    /// The release's display name, or its tag when the name is blank.
    pub fn version(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }
}

/// Something that can report the latest published release.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self) -> Result<Release>;
}

/// Queries `GET /repos/{owner}/{repo}/releases/latest`.
pub struct GithubReleases {
    client: Client,
    api_base_url: String,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GithubReleases {
    pub fn new(client: Client, endpoints: &EndpointsConfig, token: Option<String>) -> Self {
        Self {
            client,
            api_base_url: endpoints.api_base_url.trim_end_matches('/').to_string(),
            owner: endpoints.owner.clone(),
            repo: endpoints.repo.clone(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn latest_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base_url, self.owner, self.repo
        )
    }
}

#[async_trait]
impl ReleaseSource for GithubReleases {
    async fn latest_release(&self) -> Result<Release> {
        let url = self.latest_url();
        debug!(url = %url, authenticated = self.token.is_some(), "Requesting latest release.");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send release query to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read release query error body")?;
            debug!(%status, body = %error_text, "Release query failed.");
            return Err(anyhow!("Release query failed: {} - {}", status, error_text));
        }

        response
            .json::<Release>()
            .await
            .context("Failed to deserialize release query response")
    }
}

/// Returns the version to install, querying `source` only for empty or `latest`.
pub async fn resolve_version(requested: &str, source: &dyn ReleaseSource) -> Result<String> {
    if !is_latest(requested) {
        return Ok(requested.trim().to_string());
    }
    debug!("Requesting for [latest] version ...");
    let release = source.latest_release().await?;
    let version = release.version().to_string();
    debug!("... version resolved to [{}]", version);
    Ok(version)
}
