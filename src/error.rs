//! Typed errors for the pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! The split mirrors the failure taxonomy of the pipeline: only
//! [`PipelineError`] variants abort a run; [`InferenceError`] and
//! [`FetchError`] are captured at batch/record granularity and surface
//! as warnings on the run report.

use thiserror::Error;

/// Run-level errors. Only these can end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every configured source was empty or unreachable; nothing to process.
    #[error("no source produced any articles")]
    SourceUnavailable,

    /// The run was aborted between stages.
    #[error("pipeline run cancelled")]
    Cancelled,

    /// Configuration error (bad catalog data, invalid batch size, ...)
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization failed outside of LLM response salvage.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the local LLM inference service.
///
/// Always scoped to a single batch (or a single enrichment re-extraction);
/// recorded, never propagated as fatal.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    /// The inference call exceeded its timeout.
    #[error("inference timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The service could not be reached or returned a transport error.
    #[error("inference service unavailable: {0}")]
    Unavailable(String),

    /// The model responded but no structured payload could be recovered.
    #[error("malformed inference response: {0}")]
    Malformed(String),
}

/// Errors from the enrichment web-fetch collaborator.
///
/// Always scoped to a single record.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The fetch exceeded its timeout.
    #[error("fetch timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The site could not be reached.
    #[error("site unreachable: {0}")]
    Unreachable(String),

    /// The fetch succeeded but yielded no usable text.
    #[error("no usable text at {url}")]
    EmptyBody { url: String },
}

/// Result type alias for run-level operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for inference calls.
pub type InferenceResult<T> = std::result::Result<T, InferenceError>;

/// Result type alias for enrichment fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
