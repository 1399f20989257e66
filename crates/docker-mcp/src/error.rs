//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC code for a tool name that is not registered
pub const UNKNOWN_OPERATION_CODE: i32 = -32601;

/// JSON-RPC code for arguments rejected by validation
pub const INVALID_PARAMETERS_CODE: i32 = -32602;

/// JSON-RPC code (server error range) for runtime failures
pub const EXECUTION_FAILURE_CODE: i32 = -32000;

/// JSON-RPC code for internal server errors
pub const INTERNAL_ERROR_CODE: i32 = -32603;

/// Errors that can occur during MCP server operations
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown tool requested
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Tool arguments rejected by the parameter schema
    #[error("invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// The container runtime failed, timed out, or produced unusable output
    #[error("execution failed: {message}")]
    ExecutionFailure { message: String },

    /// Invalid server configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    pub fn execution_failure(message: impl Into<String>) -> Self {
        Self::ExecutionFailure {
            message: message.into(),
        }
    }

    /// JSON-RPC error code reported to the caller
    pub fn code(&self) -> i32 {
        match self {
            Self::UnknownOperation(_) => UNKNOWN_OPERATION_CODE,
            Self::InvalidParameters { .. } => INVALID_PARAMETERS_CODE,
            Self::ExecutionFailure { .. } => EXECUTION_FAILURE_CODE,
            _ => INTERNAL_ERROR_CODE,
        }
    }

    /// Stable category name carried in the error `data` field
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownOperation(_) => "unknown_operation",
            Self::InvalidParameters { .. } => "invalid_parameters",
            Self::ExecutionFailure { .. } => "execution_failure",
            _ => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_by_category() {
        let unknown = Error::UnknownOperation("docker_run".to_string());
        assert_eq!(unknown.code(), -32601);
        assert_eq!(unknown.category(), "unknown_operation");

        let invalid = Error::invalid_parameters("missing container");
        assert_eq!(invalid.code(), -32602);
        assert_eq!(invalid.category(), "invalid_parameters");

        let failed = Error::execution_failure("no such container");
        assert_eq!(failed.code(), -32000);
        assert_eq!(failed.category(), "execution_failure");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = Error::Config("timeout must be positive".to_string());
        assert_eq!(err.code(), INTERNAL_ERROR_CODE);
        assert_eq!(err.category(), "internal_error");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::UnknownOperation("x".into()).to_string(),
            "unknown operation: x"
        );
        assert_eq!(
            Error::execution_failure("boom").to_string(),
            "execution failed: boom"
        );
    }
}
