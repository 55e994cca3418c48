/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;

use cityfeed::errors::{FetchError, StartupError};

#[test]
fn test_fetchError_requestFailed_shouldDisplayCorrectly() {
    let error = FetchError::RequestFailed("Connection reset".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection reset"));
}

#[test]
fn test_fetchError_status_shouldDisplayStatusAndMessage() {
    let error = FetchError::Status {
        status_code: 404,
        message: "city not found".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("404"));
    assert!(display.contains("city not found"));
}

#[test]
fn test_fetchError_fromSerdeError_shouldBeParseError() {
    let serde_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: FetchError = serde_error.into();
    assert!(matches!(error, FetchError::ParseError(_)));
}

#[test]
fn test_startupError_missingCredential_shouldNameTheFile() {
    let error = StartupError::MissingCredential(PathBuf::from("api_key.txt"));
    let display = format!("{}", error);
    assert!(display.contains("api_key.txt"));
}

#[test]
fn test_startupError_invalidRunState_shouldShowContent() {
    let error = StartupError::InvalidRunState {
        path: PathBuf::from("run_number.txt"),
        content: "abc".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("run_number.txt"));
    assert!(display.contains("abc"));
}
