//! Error types and error codes for confkeeper
//!
//! This module defines:
//! - `ConfkeeperError`: the error taxonomy every store and registry operation returns
//! - `ErrorCode`: structured error codes handlers translate into wire responses

use sea_orm::DbErr;
use serde::{Deserialize, Serialize};

/// Result alias used by all core operations
pub type Result<T> = std::result::Result<T, ConfkeeperError>;

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum ConfkeeperError {
    /// A referenced entity (record, key, user, role, grant, tenant) is absent
    #[error("{0} not found")]
    NotFound(String),

    /// A uniqueness rule would be violated
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Version race or an entity that still has dependents
    #[error("conflict: {0}")]
    Conflict(String),

    /// The access decision denied the request
    #[error("access denied: {0}")]
    Forbidden(String),

    /// A caller supplied value is outside the whitelist or malformed
    #[error("caused: {0}")]
    ValidationError(String),

    /// The persistent store failed; the only kind worth retrying
    #[error("store error: {0}")]
    StoreError(#[from] DbErr),
}

impl ConfkeeperError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationError(reason.into())
    }

    /// Whether the caller may retry the same request unchanged.
    ///
    /// All other kinds are deterministic given the current state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreError(_))
    }

    /// Structured code for handlers translating into transport responses
    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            Self::NotFound(_) => RESOURCE_NOT_FOUND,
            Self::AlreadyExists(_) => RESOURCE_ALREADY_EXISTS,
            Self::Conflict(_) => RESOURCE_CONFLICT,
            Self::Forbidden(_) => ACCESS_DENIED,
            Self::ValidationError(_) => PARAMETER_VALIDATE_ERROR,
            Self::StoreError(_) => DATA_ACCESS_ERROR,
        }
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "resource conflict",
};

pub const RESOURCE_ALREADY_EXISTS: ErrorCode<'static> = ErrorCode {
    code: 20006,
    message: "resource already exists",
};
