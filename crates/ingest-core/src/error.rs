//! Error types module
//!
//! Two families live here:
//!
//! - [`PipelineError`] classifies failures inside the verdict pipeline. Every remote-call
//!   error is converted into one of its kinds at the component boundary that issued the
//!   call, so nothing unwinds past the poller loop.
//! - [`AppError`] is the request-serving error. It self-describes its HTTP presentation
//!   through [`ErrorMetadata`] so that sensitive details never reach the client.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues and residual risk
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Failure taxonomy of the ingestion pipeline.
///
/// `PolicyViolation` and `ResidualRisk` are informational: they describe outcomes that
/// are logged and acknowledged, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A queue, storage or credential-provider call failed. Retried by redelivery or the next poll.
    TransientInfrastructure,
    /// The payload cannot be understood. Redelivery cannot fix it.
    MalformedInput,
    /// The event belongs to another bucket or tenant.
    PolicyViolation,
    /// Cleanup of the landing object failed after a routing decision was carried out.
    ResidualRisk,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TransientInfrastructure => "transient_infrastructure",
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::PolicyViolation => "policy_violation",
            ErrorKind::ResidualRisk => "residual_risk",
        }
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            ErrorKind::TransientInfrastructure => LogLevel::Error,
            ErrorKind::MalformedInput => LogLevel::Warn,
            ErrorKind::PolicyViolation => LogLevel::Debug,
            ErrorKind::ResidualRisk => LogLevel::Warn,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that stop a single message from completing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{operation} failed: {message}")]
    TransientInfrastructure {
        operation: &'static str,
        message: String,
    },

    #[error("Malformed verdict event: {0}")]
    MalformedInput(String),
}

impl PipelineError {
    pub fn transient(operation: &'static str, err: impl std::fmt::Display) -> Self {
        PipelineError::TransientInfrastructure {
            operation,
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::TransientInfrastructure { .. } => ErrorKind::TransientInfrastructure,
            PipelineError::MalformedInput(_) => ErrorKind::MalformedInput,
        }
    }

    /// Whether the message that produced this error may be acknowledged.
    ///
    /// Malformed payloads are dropped; transient failures must be left for redelivery.
    pub fn allows_acknowledgement(&self) -> bool {
        matches!(self, PipelineError::MalformedInput(_))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::MalformedInput(err.to_string())
    }
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "CREDENTIAL_PROVIDER_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Credential provider error: {0}")]
    CredentialProvider(String),

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce the request size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check authentication token"),
            true,
            LogLevel::Debug,
        ),
        AppError::CredentialProvider(_) => (
            502,
            "CREDENTIAL_PROVIDER_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Generation(_) => (
            502,
            "GENERATION_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::ServiceUnavailable(_) => (
            503,
            "SERVICE_UNAVAILABLE",
            false,
            Some("This feature is not enabled on this deployment"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::CredentialProvider(_) => "CredentialProvider",
            AppError::Generation(_) => "Generation",
            AppError::ServiceUnavailable(_) => "ServiceUnavailable",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            // Verifier detail stays in the logs.
            AppError::Unauthorized(_) => "Invalid or missing authentication token".to_string(),
            AppError::CredentialProvider(_) => "Failed to issue upload credentials".to_string(),
            AppError::Generation(_) => "Failed to generate a response".to_string(),
            AppError::ServiceUnavailable(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
