//! Error taxonomy for the transformation pipeline.
//!
//! Every stage returns one of these kinds explicitly instead of catching
//! opportunistically at the outer boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlchemistError {
    /// The uploaded bytes are not a valid zip container, or an entry carries
    /// a path that would escape the scratch directory.
    #[error("invalid archive: {reason}")]
    InvalidArchive { reason: String },

    /// An extracted member could not be opened or is not valid UTF-8 text.
    #[error("unreadable file {path}: {reason}")]
    UnreadableFile { path: String, reason: String },

    /// Transport-level failure reaching the completion endpoint.
    #[error("network failure reaching completion endpoint: {reason}")]
    NetworkFailure { reason: String },

    /// The completion endpoint answered with a non-success status.
    #[error("completion endpoint returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Success status, but the response body lacks the expected reply field.
    #[error("unexpected completion response format: {reason}")]
    UnexpectedResponseFormat { reason: String },

    /// Scratch or output filesystem operation failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the final output archive to its destination failed.
    #[error("failed to write output archive {path}: {reason}")]
    OutputWriteFailed { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AlchemistError>;
