pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create malformed query error for a capture that cannot be normalized
pub fn malformed_query_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(format!("Malformed query: {}", message.into()))
}

/// Create invalid configuration error
///
/// Thresholds are pass-wide, so this fails an inspection before any
/// detector runs.
pub fn invalid_config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(format!("Invalid configuration: {}", message.into()))
}

/// Create unknown pattern type error
///
/// Raised when a finding carries a pattern with no registered tip template.
/// Internal consistency error, never caught locally.
pub fn unknown_pattern_error(pattern: impl std::fmt::Display) -> AppError {
    AppError::internal(format!(
        "No optimization tip registered for pattern '{}'",
        pattern
    ))
}
