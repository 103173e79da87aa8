//! Error taxonomy for the diff pipeline
//!
//! All errors are raised synchronously at the point of detection. The
//! pipeline is deterministic and pure, so none of them are worth retrying
//! with the same input.

use thiserror::Error;

/// Errors produced while loading, normalizing, or diffing documents.
#[derive(Debug, Error)]
pub enum MdiffError {
    /// Input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8 text")]
    Decoding(#[source] std::str::Utf8Error),

    /// Input is neither text, bytes, nor a readable stream.
    #[error("unsupported input kind: {0}")]
    UnsupportedInput(String),

    /// A caller-supplied option is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A readable stream failed while being drained.
    #[error("failed to read input")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MdiffError>;
