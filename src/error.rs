//! Failure taxonomy for the two collaborator stages
//!
//! Both kinds are non-fatal: callers log them, clear the relevant in-progress
//! flag, and leave previously displayed state untouched. The Network / Api /
//! Parse split exists for observability only; no variant triggers a blocking
//! error surface or a retry.

use thiserror::Error;

/// Filter-inference collaborator errors
#[derive(Debug, Error)]
pub enum FilterError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Filter service returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the filter response JSON
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Song-search collaborator errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Search service returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the result list JSON
    #[error("Parse error: {0}")]
    Parse(String),
}
