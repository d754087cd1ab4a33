// crates/backend-lib/src/error.rs

//! Central error type.
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown login, wrong password and locked account all map here so
    /// callers cannot tell them apart.
    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("User store error: {0}")]
    UserStore(String),

    #[error("Invalid pool index {index} (pool capacity {capacity})")]
    InvalidPoolIndex { index: usize, capacity: usize },

    #[error("Pool slot {0} is not checked out")]
    SlotNotCheckedOut(usize),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unhashed credentials for: {}", .0.join(", "))]
    UnhashedCredentials(Vec<String>),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "AUTH_001",
            AppError::UserStore(_) => "STORE_001",
            AppError::InvalidPoolIndex { .. } => "POOL_001",
            AppError::SlotNotCheckedOut(_) => "POOL_002",
            AppError::Connection(_) => "POOL_003",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::Config(_) => "CFG_001",
            AppError::UnhashedCredentials(_) => "CRED_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for showing to end users
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Authentication failed".to_string(),
            AppError::UserStore(_) => {
                "Authentication is temporarily unavailable".to_string()
            },
            AppError::InvalidPoolIndex { .. } | AppError::SlotNotCheckedOut(_) => {
                "Invalid connection handle".to_string()
            },
            AppError::Connection(_) => "Database connection failed".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::Config(_) => "Invalid configuration".to_string(),
            AppError::UnhashedCredentials(_) => {
                "Some accounts still use unprotected passwords".to_string()
            },
            AppError::Internal(_) | AppError::Io(_) => {
                "An internal error occurred".to_string()
            },
            AppError::Json(_) => "Invalid data format".to_string(),
        }
    }

    /// Whether this error is a rejected login rather than a system fault
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::InvalidCredentials)
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
