use thiserror::Error;

/// Receipt rendering / writing failure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdf encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("pdf serialization failed: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("failed to write receipt to {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
