// tfdocs-setup-core/src/lib.rs

#![doc = include_str!("../../README.md")]

pub mod config;
pub mod errors;
pub mod installer;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod tool_cache;
pub mod wrapper;

#[cfg(test)]
mod test_support;

pub use config::{EndpointsConfig, InstallerConfig};
pub use errors::SetupError;
pub use installer::{download_url, InstallOutcome, Installer};
pub use pipeline::{GithubActions, Pipeline};
pub use platform::{ArchiveFormat, Platform};
pub use release::{GithubReleases, Release, ReleaseSource};
pub use tool_cache::{HttpToolCache, ToolCache};
pub use wrapper::CommandOutput;

pub use async_trait::async_trait;
