// src/core/error.rs

use thiserror::Error;

/// Failures the engine can report.
///
/// Only `InvalidInput` and `MalformedUrl` ever reach a caller, and even then
/// they are folded into a `success: false` response by the public entry points.
/// `ProbeFailure` is absorbed inside the TLS probe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    #[error("TLS probe failed: {0}")]
    ProbeFailure(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
