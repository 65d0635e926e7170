//! Error types for the help desk core crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by catalog and console operations.
#[derive(Debug, Error)]
pub enum HelpDeskError {
    /// Tool id is not in the catalog.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Two catalog entries share an id.
    #[error("duplicate tool id: {0}")]
    DuplicateTool(String),
    /// A model override was configured for a tool that runs fixed models.
    #[error("tool `{0}` does not accept a model override")]
    UnsupportedOverride(String),
    /// Attachment could not be loaded.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
}

/// Errors raised while reading a file into an attachment.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The path exists but is not a regular file.
    #[error("{0} is not a file")]
    NotAFile(PathBuf),
    /// The file is larger than the inline data limit.
    #[error("{file_name} is {size_bytes} bytes; the limit is {max_bytes} bytes")]
    TooLarge {
        file_name: String,
        size_bytes: u64,
        max_bytes: u64,
    },
}
