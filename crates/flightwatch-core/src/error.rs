//! Error taxonomy for the telemetry pipeline.

/// Errors raised while producing or classifying a snapshot.
///
/// Inside a scheduled tick these are logged and swallowed by the
/// scheduler; on the direct [`generate`](crate::pipeline::TelemetryPipeline::generate)
/// path they propagate to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    /// A required input was absent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The generator or classifier failed.
    #[error("{stage} failed: {message}")]
    Upstream {
        /// Pipeline stage that failed (`"generate"` or `"classify"`).
        stage: &'static str,
        /// Description of the failure.
        message: String,
    },
}
