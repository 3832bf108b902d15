// Errors the rest of the crate branches on.
//
// Everything else travels as `anyhow::Error` with context attached; these
// variants exist so callers can `downcast_ref` and decide what to do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("{endpoint} failed: {status} - {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The upload response carried neither `id` nor `batchId`.
    #[error("upload response has no batch identifier (expected `id` or `batchId`): {body}")]
    MissingBatchId { body: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::MissingBatchId { .. } => None,
        }
    }
}
