//! Domain-specific error types.
//!
//! Uses `thiserror` for structured error definitions; the orchestration
//! layer and the CLI wrap these in `anyhow`.

use std::time::Duration;
use thiserror::Error;

/// Longest input prefix quoted back in an error message.
pub const DIAGNOSTIC_PREFIX_LEN: usize = 40;

/// Errors from turning hex text into bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoaderError {
    #[error("invalid hex input: {0}")]
    InvalidHex(String),

    #[error("odd-length hex input ({0} digits)")]
    OddLength(usize),

    #[error("call data too short ({0} bytes, need at least 4 for a selector)")]
    TooShort(usize),
}

/// Why an external decompiler backend declined.
///
/// None of these are fatal: the adapter logs them and moves on to the next
/// backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to stage bytecode: {0}")]
    Stage(#[source] std::io::Error),

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("`{program}` exited with {status}")]
    ExitStatus { program: String, status: String },

    #[error("`{0}` produced no output")]
    EmptyOutput(String),

    #[error("`{0}` produced non UTF-8 output")]
    InvalidUtf8(String),
}

/// Errors from extending the signature registry.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid ABI JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unable to parse contract source; provide ABI JSON or Solidity code (got `{0}`)")]
    UnrecognizedSource(String),

    #[error("solidity compilation failed: {0}")]
    Compile(#[from] BackendError),

    #[error("unexpected compiler output: {0}")]
    CompilerOutput(String),
}

/// Shorten `input` to at most [`DIAGNOSTIC_PREFIX_LEN`] characters for display.
pub fn bounded(input: &str) -> String {
    bounded_to(input, DIAGNOSTIC_PREFIX_LEN)
}

/// Shorten `input` to at most `max` characters, appending `...` when cut.
pub fn bounded_to(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &input[..cut]),
        None => input.to_string(),
    }
}
