// tfdocs-setup-core/src/tool_cache.rs

//! Download and extraction of release archives.
//!
//! Each download and each extraction lands in its own uniquely named entry
//! under a temp root, so repeated installs in one job never collide.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::Client;
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

const CACHE_DIR_NAME: &str = "setup-terraform-docs";

/// Download/extract operations the installer depends on.
#[async_trait]
pub trait ToolCache: Send + Sync {
    /// Downloads `url` to a fresh temp file and returns its path.
    async fn download_tool(&self, url: &str) -> Result<PathBuf>;
    /// Extracts a zip archive into a fresh directory and returns it.
    async fn extract_zip(&self, archive: &Path) -> Result<PathBuf>;
    /// Extracts a gzip'd tar archive into a fresh directory and returns it.
    async fn extract_tar(&self, archive: &Path) -> Result<PathBuf>;
}

/// Runner temp dir, then the user cache dir, then the OS temp dir.
pub fn default_temp_root() -> PathBuf {
    env::var_os("RUNNER_TEMP")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|d| d.join(CACHE_DIR_NAME)))
        .unwrap_or_else(|| env::temp_dir().join(CACHE_DIR_NAME))
}

pub struct HttpToolCache {
    client: Client,
    temp_root: PathBuf,
}

impl HttpToolCache {
    pub fn new(client: Client, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            temp_root: temp_root.into(),
        }
    }

    fn fresh_entry(&self) -> PathBuf {
        self.temp_root.join(Uuid::new_v4().to_string())
    }

    fn fresh_dir(&self) -> Result<PathBuf> {
        let dest = self.fresh_entry();
        fs::create_dir_all(&dest)
            .with_context(|| format!("Failed to create extraction directory {}", dest.display()))?;
        Ok(dest)
    }
}

#[async_trait]
impl ToolCache for HttpToolCache {
    async fn download_tool(&self, url: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.temp_root)
            .await
            .with_context(|| format!("Failed to create temp root {}", self.temp_root.display()))?;
        let dest = self.fresh_entry();
        info!(url = %url, dest = %dest.display(), "Downloading release archive.");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send download request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Unexpected HTTP response from {}: {}", url, status));
        }

        let mut file = tokio::fs::File::create(&dest)
            .await
            .with_context(|| format!("Failed to create download file {}", dest.display()))?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to read download body from {}", url))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write to {}", dest.display()))?;
            written += chunk.len() as u64;
        }
        file.flush().await.context("Failed to flush downloaded archive")?;

        debug!(bytes = written, dest = %dest.display(), "Download complete.");
        Ok(dest)
    }

    async fn extract_zip(&self, archive: &Path) -> Result<PathBuf> {
        let dest = self.fresh_dir()?;
        debug!(archive = %archive.display(), dest = %dest.display(), "Extracting zip archive.");
        let archive = archive.to_path_buf();
        let target = dest.clone();
        tokio::task::spawn_blocking(move || unpack_zip(&archive, &target))
            .await
            .context("Zip extraction task panicked")??;
        Ok(dest)
    }

    async fn extract_tar(&self, archive: &Path) -> Result<PathBuf> {
        let dest = self.fresh_dir()?;
        debug!(archive = %archive.display(), dest = %dest.display(), "Extracting tar archive.");
        let archive = archive.to_path_buf();
        let target = dest.clone();
        tokio::task::spawn_blocking(move || unpack_tar_gz(&archive, &target))
            .await
            .context("Tar extraction task panicked")??;
        Ok(dest)
    }
}

fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive {}", archive.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(dest)
        .with_context(|| format!("Failed to unpack {} into {}", archive.display(), dest.display()))
}

fn unpack_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip archive {}", archive.display()))?;
    zip.extract(dest)
        .with_context(|| format!("Failed to unpack {} into {}", archive.display(), dest.display()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// A `.tar.gz` holding each `(name, contents)` pair as an executable file.
    pub fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *contents).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::FileOptions::default().unix_permissions(0o755);
            for (name, contents) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }
}
