//! Error types for yt-view-stats
//!
//! This module provides the error taxonomy for the retrieval pipeline:
//! - [`Error`], the type every public operation returns
//! - [`ApiError`], a single failed call against the remote API, before the
//!   retry governor has classified it
//! - [`EmitError`], failures of the report sink
//! - [`PartialBatch`], the records salvaged when a later detail batch fails

use crate::types::VideoRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for yt-view-stats operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for yt-view-stats
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "retry.max_attempts")
        key: Option<String>,
    },

    /// The API key is empty or contains characters an API key never has
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    /// The channel reference matches none of the supported shapes
    #[error("invalid channel reference: {0}")]
    InvalidReference(String),

    /// The lookup succeeded but no channel matched the reference
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// The lookup returned more than one channel for a single reference
    #[error("channel reference {reference} is ambiguous: {matches} channels matched")]
    AmbiguousReference {
        /// The reference as the user supplied it
        reference: String,
        /// Number of channels the lookup returned
        matches: usize,
    },

    /// A retryable API failure that persisted through every allowed attempt
    #[error("{operation} failed after {attempts} attempts: {source}")]
    TransientApi {
        /// Logical API operation (e.g., "playlistItems.list")
        operation: &'static str,
        /// Number of attempts made, including the first
        attempts: u32,
        /// The last failure observed
        #[source]
        source: ApiError,
    },

    /// A non-retryable API failure (authentication, malformed request, not found, bad payload)
    #[error("{operation} failed: {source}")]
    FatalApi {
        /// Logical API operation (e.g., "videos.list")
        operation: &'static str,
        /// The failure reported by the transport
        #[source]
        source: ApiError,
    },

    /// Some detail batches succeeded before a later one failed
    #[error(
        "detail fetch stopped after {} of {} batches ({} records kept): {source}",
        .partial.completed_batches,
        .partial.total_batches,
        .partial.records.len()
    )]
    PartialBatchFailure {
        /// Records collected from the batches that completed
        partial: Box<PartialBatch>,
        /// The failure that stopped the batch loop
        #[source]
        source: Box<Error>,
    },

    /// Report emission failed
    #[error("report error: {0}")]
    Emit(#[from] EmitError),
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create a fatal API error for a response the pipeline could not interpret
    pub fn malformed(operation: &'static str, message: impl Into<String>) -> Self {
        Error::FatalApi {
            operation,
            source: ApiError::Malformed(message.into()),
        }
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidApiKey(_) => "invalid_api_key",
            Error::InvalidReference(_) => "invalid_reference",
            Error::ChannelNotFound(_) => "channel_not_found",
            Error::AmbiguousReference { .. } => "ambiguous_reference",
            Error::TransientApi { .. } => "transient_api_error",
            Error::FatalApi { .. } => "fatal_api_error",
            Error::PartialBatchFailure { .. } => "partial_batch_failure",
            Error::Emit(_) => "emit_error",
        }
    }

    /// Records salvaged before a [`Error::PartialBatchFailure`], if this is one
    pub fn partial_records(&self) -> Option<&[VideoRecord]> {
        match self {
            Error::PartialBatchFailure { partial, .. } => Some(&partial.records),
            _ => None,
        }
    }
}

/// Records collected by the detail batcher before a later batch failed
#[derive(Debug, Clone)]
pub struct PartialBatch {
    /// Records from every batch that completed, in fetch order
    pub records: Vec<VideoRecord>,
    /// Number of batches that completed successfully
    pub completed_batches: usize,
    /// Number of batches the request was split into
    pub total_batches: usize,
}

/// A single failed call against the YouTube Data API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Google error reason (e.g., "quotaExceeded"), if the body carried one
        reason: Option<String>,
        /// Human-readable message from the error body or the status line
        message: String,
    },

    /// The response body could not be interpreted
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Malformed(e.to_string())
    }
}

/// Errors produced by a report sink
#[derive(Debug, Error)]
pub enum EmitError {
    /// I/O error while creating or writing the artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to assemble the workbook archive
    #[error("workbook packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Nothing to report
    #[error("series for channel {channel} is empty")]
    EmptySeries {
        /// Channel title the report was requested for
        channel: String,
    },

    /// The output directory does not exist or is not a directory
    #[error("output directory {0} is not a directory")]
    InvalidOutputDir(PathBuf),
}
