use thiserror::Error;

/// Main error type for the selftime profiler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfilerError {
    /// `end_timer` called for a name that was never started
    #[error("Unknown timer: '{name}' was never started")]
    UnknownTimer {
        name: String,
    },

    /// `end_timer` called for a timer that is not the innermost open region
    #[error("Out-of-order end: '{}' is not the innermost open timer (innermost: {})", .name, .innermost.as_deref().unwrap_or("<none>"))]
    OutOfOrderEnd {
        name: String,
        innermost: Option<String>,
    },

    /// `start_timer` called for a timer that is already open further up the stack
    #[error("Timer '{name}' is already active")]
    AlreadyActive {
        name: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(String),
}

impl ProfilerError {
    pub fn unknown_timer(name: &str) -> Self {
        ProfilerError::UnknownTimer {
            name: name.to_string(),
        }
    }

    pub fn out_of_order(name: &str, innermost: Option<&str>) -> Self {
        ProfilerError::OutOfOrderEnd {
            name: name.to_string(),
            innermost: innermost.map(str::to_string),
        }
    }

    pub fn already_active(name: &str) -> Self {
        ProfilerError::AlreadyActive {
            name: name.to_string(),
        }
    }

    /// Create a configuration error with the operation that failed
    pub fn config_error(operation: &str, message: impl std::fmt::Display) -> Self {
        ProfilerError::ConfigurationError(format!("{}: {}", operation, message))
    }
}

impl From<std::io::Error> for ProfilerError {
    fn from(err: std::io::Error) -> Self {
        ProfilerError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ProfilerError {
    fn from(err: serde_json::Error) -> Self {
        ProfilerError::SerializationError(err.to_string())
    }
}

/// Result type for profiler operations
pub type ProfilerResult<T> = Result<T, ProfilerError>;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnknownTimer,
    OutOfOrderEnd,
    AlreadyActive,
    ConfigInvalid,
    SerializationFailed,
    IoFailed,
}

impl ProfilerError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ProfilerError::UnknownTimer { .. } => ErrorCode::UnknownTimer,
            ProfilerError::OutOfOrderEnd { .. } => ErrorCode::OutOfOrderEnd,
            ProfilerError::AlreadyActive { .. } => ErrorCode::AlreadyActive,
            ProfilerError::ConfigurationError(_) => ErrorCode::ConfigInvalid,
            ProfilerError::SerializationError(_) => ErrorCode::SerializationFailed,
            ProfilerError::IoError(_) => ErrorCode::IoFailed,
        }
    }

    /// Caller-contract errors leave the profiler untouched, so the caller may
    /// inspect the state and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::UnknownTimer | ErrorCode::OutOfOrderEnd | ErrorCode::AlreadyActive
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ProfilerError::UnknownTimer { name } => {
                format!("Unknown timer '{}'\n\nEvery end_timer call needs a matching start_timer call with the same name.", name)
            }
            ProfilerError::OutOfOrderEnd { name, innermost } => {
                let open = innermost.as_deref().unwrap_or("<none>");
                format!("Out-of-order end for '{}'\n\nTimers must be ended innermost-first. The innermost open timer is '{}'.", name, open)
            }
            ProfilerError::AlreadyActive { name } => {
                format!("Timer '{}' is already active\n\nA timer cannot be nested inside itself. End the outer '{}' first or use a different name.", name, name)
            }
            _ => self.to_string(),
        }
    }
}
