/*!
 * Error types for the cityfeed application.
 *
 * Fetch failures are local to a single city or query and never abort a run.
 * Startup failures abort before any work begins.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when calling one of the upstream REST APIs
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the connection dropped
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-success status
    #[error("API responded with error: {status_code} - {message}")]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Response body, as returned by the API
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::ParseError(error.to_string())
    }
}

/// Errors that stop the process before any ingestion happens
#[derive(Error, Debug)]
pub enum StartupError {
    /// Credential file missing or unreadable
    #[error("Credential file not found: {0:?}. Ensure it contains your API key.")]
    MissingCredential(PathBuf),

    /// Credential file present but blank
    #[error("Credential file is empty: {0:?}")]
    EmptyCredential(PathBuf),

    /// Paginated run-state file is required and absent
    #[error("Run-state file not found: {0:?}")]
    MissingRunState(PathBuf),

    /// Run-state file exists but could not be read
    #[error("Failed to read run-state file {path:?}: {source}")]
    UnreadableRunState {
        /// Path of the counter file
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Run-state file does not hold a non-negative integer
    #[error("Run-state file {path:?} holds an invalid counter: {content:?}")]
    InvalidRunState {
        /// Path of the counter file
        path: PathBuf,
        /// Raw file content
        content: String,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
