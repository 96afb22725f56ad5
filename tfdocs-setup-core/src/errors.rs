// tfdocs-setup-core/src/errors.rs
use thiserror::Error;

/// Errors that can abort an installation or a wrapped invocation.
///
/// Every variant means the operation failed; the variant only names the stage
/// that failed, and the underlying cause is kept as the source.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Error related to inputs or the endpoints configuration.
    #[error("Configuration Error: {0}")]
    Config(#[source] anyhow::Error),

    /// Error while querying the release API for the latest version.
    #[error("Release Query Error: {0}")]
    Release(#[source] anyhow::Error),

    /// Error while downloading the release archive.
    #[error("Download Error: {0}")]
    Download(#[source] anyhow::Error),

    /// Error while unpacking the release archive.
    #[error("Extraction Error: {0}")]
    Extract(#[source] anyhow::Error),

    /// Error while moving the real binary or copying the wrapper into place.
    #[error("Install Error: {0}")]
    Install(#[source] anyhow::Error),

    /// Error while writing to the pipeline's command files.
    #[error("Pipeline Error: {0}")]
    Pipeline(#[source] anyhow::Error),

    /// Error while locating or spawning the wrapped binary.
    #[error("Execution Error: {0}")]
    Exec(#[source] anyhow::Error),
}
