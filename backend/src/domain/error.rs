//! Domain-level error types.
//!
//! These errors are transport agnostic. Callers map them to HTTP responses,
//! CLI exit codes, or any other protocol-specific envelope. Messages never
//! carry credential material.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// One or more input fields failed validation.
    ValidationFailed,
    /// Another account already uses the (case-folded) email address.
    DuplicateEmail,
    /// An account attempted to follow itself.
    SelfFollow,
    /// A referenced account does not exist.
    UnknownAccount,
    /// The requested resource does not exist.
    NotFound,
    /// Storage was unreachable or did not answer before the deadline.
    StorageUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

impl ErrorCode {
    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation failed",
            Self::DuplicateEmail => "email has already been taken",
            Self::SelfFollow => "an account cannot follow itself",
            Self::UnknownAccount => "account does not exist",
            Self::NotFound => "resource not found",
            Self::StorageUnavailable => "storage unavailable",
            Self::InternalError => "internal error",
        }
    }
}

/// A single rejected input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Input field name, e.g. `email` or `password_confirmation`.
    pub field: String,
    /// Human-readable rejection reason.
    pub reason: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is never blank; blank input falls back to the code's default
///   wording.
///
/// # Examples
/// ```
/// use social_backend::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to callers.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for callers.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Whether the failure is transient.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::{Error, ErrorCode};
    /// use serde_json::json;
    ///
    /// let err = Error::new(ErrorCode::UnknownAccount, "gone")
    ///     .with_details(json!({ "accountId": "abc" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Validation failure naming every offending field.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::{Error, ErrorCode, FieldViolation};
    ///
    /// let err = Error::validation(vec![FieldViolation::new("email", "is invalid")]);
    /// assert_eq!(err.code(), ErrorCode::ValidationFailed);
    /// assert_eq!(err.violations()[0].field, "email");
    /// ```
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        let fields = violations
            .iter()
            .map(|violation| violation.field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            ErrorCode::ValidationFailed,
            format!("validation failed: {fields}"),
        )
        .with_details(json!({ "violations": violations }))
    }

    /// Field violations carried by a [`ErrorCode::ValidationFailed`] error.
    pub fn violations(&self) -> Vec<FieldViolation> {
        self.details
            .as_ref()
            .and_then(|details| details.get("violations"))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    /// Convenience constructor for [`ErrorCode::DuplicateEmail`].
    pub fn duplicate_email() -> Self {
        Self::new(ErrorCode::DuplicateEmail, "")
    }

    /// Convenience constructor for [`ErrorCode::SelfFollow`].
    pub fn self_follow() -> Self {
        Self::new(ErrorCode::SelfFollow, "")
    }

    /// Convenience constructor for [`ErrorCode::UnknownAccount`].
    pub fn unknown_account(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownAccount, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::StorageUnavailable`].
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
