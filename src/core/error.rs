//! Typed error handling for the nursery order service
//!
//! Every failure that can leave the core is one of the categories below.
//! Handlers return [`NurseryError`] directly; it knows its HTTP status and a
//! stable error code for clients.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: a stage submission or edit was rejected
//! - [`SessionError`]: the session is unknown, in the wrong stage, or an
//!   index does not exist
//! - [`AuthError`]: login or token problems
//! - [`RequestError`]: malformed request bodies
//! - [`ConfigError`]: configuration or user store could not be loaded
//!
//! # Example
//!
//! ```rust,ignore
//! match session.submit_distribution() {
//!     Ok(entries) => println!("{} entries accepted", entries.len()),
//!     Err(NurseryError::Validation(ValidationError::QuantityConstraint(
//!         QuantityViolation::OverAllocated { distributed, total },
//!     ))) => println!("{} over the {} ordered", distributed - total, total),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::core::session::Stage;

/// The main error type for the service
#[derive(Debug)]
pub enum NurseryError {
    /// Form validation errors (missing fields, quantity constraints)
    Validation(ValidationError),

    /// Session workflow errors
    Session(SessionError),

    /// Authentication errors
    Auth(AuthError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for NurseryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NurseryError::Validation(e) => write!(f, "{}", e),
            NurseryError::Session(e) => write!(f, "{}", e),
            NurseryError::Auth(e) => write!(f, "{}", e),
            NurseryError::Request(e) => write!(f, "{}", e),
            NurseryError::Config(e) => write!(f, "{}", e),
            NurseryError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for NurseryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NurseryError::Validation(e) => Some(e),
            NurseryError::Session(e) => Some(e),
            NurseryError::Auth(e) => Some(e),
            NurseryError::Request(e) => Some(e),
            NurseryError::Config(e) => Some(e),
            NurseryError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl NurseryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            NurseryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            NurseryError::Session(e) => e.status_code(),
            NurseryError::Auth(e) => e.status_code(),
            NurseryError::Request(_) => StatusCode::BAD_REQUEST,
            NurseryError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NurseryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            NurseryError::Validation(e) => e.error_code(),
            NurseryError::Session(e) => e.error_code(),
            NurseryError::Auth(e) => e.error_code(),
            NurseryError::Request(e) => e.error_code(),
            NurseryError::Config(_) => "CONFIG_ERROR",
            NurseryError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            NurseryError::Validation(ValidationError::MissingField { field, index }) => {
                Some(serde_json::json!({ "field": field, "index": index }))
            }
            NurseryError::Validation(ValidationError::QuantityConstraint(
                QuantityViolation::OverAllocated { distributed, total },
            )) => Some(serde_json::json!({
                "distributed": distributed,
                "total": total
            })),
            NurseryError::Session(SessionError::WrongStage {
                expected, actual, ..
            }) => Some(serde_json::json!({
                "expected": expected,
                "actual": actual
            })),
            _ => None,
        }
    }
}

impl IntoResponse for NurseryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A rejected edit or stage submission
///
/// Validation never commits partial state: the draft that produced the error
/// is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required text field is blank or a required quantity is zero
    #[error("Required field '{field}' is missing{}", at_position(.index))]
    MissingField {
        field: &'static str,
        /// Position of the offending box or entry, if any
        index: Option<usize>,
    },

    /// Totals or counts violate a quantity rule
    #[error(transparent)]
    QuantityConstraint(#[from] QuantityViolation),
}

fn at_position(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at position {}", i + 1),
        None => String::new(),
    }
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        ValidationError::MissingField { field, index: None }
    }

    pub fn missing_at(field: &'static str, index: usize) -> Self {
        ValidationError::MissingField {
            field,
            index: Some(index),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "MISSING_FIELD",
            ValidationError::QuantityConstraint(_) => "QUANTITY_CONSTRAINT",
        }
    }
}

/// Quantity rules enforced on submit (and on resizing the lists)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityViolation {
    /// Nothing has been allocated
    #[error("At least one plant must be distributed")]
    NothingDistributed,

    /// More plants distributed than the order holds
    #[error("Distributed plants ({distributed}) exceed the order total ({total})")]
    OverAllocated { distributed: u64, total: u64 },

    /// Declared box count above the configured ceiling
    #[error("Declared box count {requested} exceeds the limit of {limit}")]
    TooManyBoxes { requested: u32, limit: u32 },

    /// Distribution list already at the configured ceiling
    #[error("Cannot add more than {limit} distribution entries")]
    TooManyEntries { limit: usize },
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors related to the order workflow session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No live session for this token
    #[error("Session '{token}' not found")]
    NotFound { token: Uuid },

    /// Operation invoked outside the stage it belongs to
    #[error("Cannot {operation} while in the {actual} stage (requires {expected})")]
    WrongStage {
        operation: &'static str,
        expected: Stage,
        actual: Stage,
    },

    /// Box or entry position does not exist
    #[error("No {collection} at position {} (have {len})", .index + 1)]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },
}

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NotFound { .. } => StatusCode::UNAUTHORIZED,
            SessionError::WrongStage { .. } => StatusCode::CONFLICT,
            SessionError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound { .. } => "SESSION_NOT_FOUND",
            SessionError::WrongStage { .. } => "WRONG_STAGE",
            SessionError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
        }
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors raised at the authentication boundary
///
/// `InvalidCredentials` deliberately carries nothing: the caller must not learn
/// whether the identifier or the secret was wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    #[error("Missing session token")]
    MissingToken,

    #[error("Malformed session token")]
    InvalidToken,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors raised while decoding a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Body is not valid JSON for the expected shape
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Body decoded but failed its field rules
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidInput { .. } => "INVALID_INPUT",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration and the user store
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for NurseryError {
    fn from(err: ValidationError) -> Self {
        NurseryError::Validation(err)
    }
}

impl From<QuantityViolation> for NurseryError {
    fn from(err: QuantityViolation) -> Self {
        NurseryError::Validation(ValidationError::QuantityConstraint(err))
    }
}

impl From<SessionError> for NurseryError {
    fn from(err: SessionError) -> Self {
        NurseryError::Session(err)
    }
}

impl From<AuthError> for NurseryError {
    fn from(err: AuthError) -> Self {
        NurseryError::Auth(err)
    }
}

impl From<RequestError> for NurseryError {
    fn from(err: RequestError) -> Self {
        NurseryError::Request(err)
    }
}

impl From<ConfigError> for NurseryError {
    fn from(err: ConfigError) -> Self {
        NurseryError::Config(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for NurseryError {
    fn from(err: anyhow::Error) -> Self {
        NurseryError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for nursery operations
pub type NurseryResult<T> = Result<T, NurseryError>;

// =============================================================================
// Tests
// =============================================================================
