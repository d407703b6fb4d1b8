//! Error types for gateway operations.
//!
//! Every fallible operation in this crate returns [`BuckarooError`]. Each
//! variant maps to a stable numeric [`BuckarooErrorCode`] so callers can
//! branch on the kind without matching on message text.

/// Numeric error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum BuckarooErrorCode {
    /// Feature not compiled in
    Unimplemented = 1000,
    /// Transport/network layer error
    Transport = 2000,
    /// Connection failed
    ConnectionFailed = 2001,
    /// Connection timeout
    ConnectionTimeout = 2002,
    /// Gateway answered with a non-success HTTP status
    InvalidResponse = 2003,
    /// Signature did not verify
    SignatureMismatch = 3000,
    /// Gateway reported a failed API call
    Api = 4000,
    /// Transaction cannot be refunded
    NonRefundable = 4001,
    /// Transaction cannot be cancelled
    NonCancellable = 4002,
    /// Configuration is incomplete or invalid
    InvalidConfig = 5000,
    /// Request argument is invalid
    InvalidArgument = 5001,
    /// Required request argument is missing
    MissingParameter = 5002,
}

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum BuckarooError {
    /// Feature not compiled in.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    /// Transport/network layer error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection failed.
    #[error("error connecting to {target}: {reason}")]
    ConnectionFailed {
        /// Target URL
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    #[error("{operation} timed out after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The gateway answered with a non-2xx HTTP status.
    #[error("invalid response received from gateway: {reason} ({status})")]
    InvalidResponse {
        /// HTTP status code
        status: u16,
        /// Status text or body excerpt
        reason: String,
    },

    /// The received signature is absent or differs from the recomputed one.
    #[error(
        "sent signature ({}) doesn't match generated signature ({generated})",
        or_empty(.sent)
    )]
    SignatureMismatch {
        /// Signature found in `brq_signature`, if any
        sent: Option<String>,
        /// Signature computed locally
        generated: String,
    },

    /// The gateway reported `brq_apiresult=Fail` or omitted the result.
    #[error("{}", api_failure_message(.status_code, .status_message, .error_message))]
    Api {
        /// `brq_statuscode`
        status_code: Option<String>,
        /// `brq_statusmessage`
        status_message: Option<String>,
        /// `brq_apierrormessage`
        error_message: Option<String>,
    },

    /// The transaction is not refundable.
    #[error("transaction {transaction_id} is not refundable")]
    NonRefundable {
        /// Transaction key
        transaction_id: String,
    },

    /// The transaction is not cancellable.
    #[error("transaction {transaction_id} is not cancellable")]
    NonCancellable {
        /// Transaction key
        transaction_id: String,
    },

    /// Configuration is invalid.
    #[error("invalid configuration {field}: {reason}")]
    InvalidConfig {
        /// Configuration field
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Request argument is invalid.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Argument name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Required request argument is missing or empty.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
}

fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn api_failure_message(
    status_code: &Option<String>,
    status_message: &Option<String>,
    error_message: &Option<String>,
) -> String {
    match (status_message, status_code, error_message) {
        (Some(message), Some(code), _) => format!("API request failed: {} ({})", message, code),
        (_, _, Some(error)) => format!("API request failed: {}", error),
        _ => "API request failed".to_string(),
    }
}

impl BuckarooError {
    /// Get the numeric error code.
    pub fn code(&self) -> BuckarooErrorCode {
        match self {
            Self::Unimplemented(_) => BuckarooErrorCode::Unimplemented,
            Self::Transport(_) => BuckarooErrorCode::Transport,
            Self::ConnectionFailed { .. } => BuckarooErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => BuckarooErrorCode::ConnectionTimeout,
            Self::InvalidResponse { .. } => BuckarooErrorCode::InvalidResponse,
            Self::SignatureMismatch { .. } => BuckarooErrorCode::SignatureMismatch,
            Self::Api { .. } => BuckarooErrorCode::Api,
            Self::NonRefundable { .. } => BuckarooErrorCode::NonRefundable,
            Self::NonCancellable { .. } => BuckarooErrorCode::NonCancellable,
            Self::InvalidConfig { .. } => BuckarooErrorCode::InvalidConfig,
            Self::InvalidArgument { .. } => BuckarooErrorCode::InvalidArgument,
            Self::MissingParameter(_) => BuckarooErrorCode::MissingParameter,
        }
    }

    /// Returns true if the failure happened below the protocol layer.
    ///
    /// The crate never retries on its own; this only tells the caller
    /// whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. }
        ) || matches!(self, Self::InvalidResponse { status, .. } if *status >= 500)
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing parameter error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = BuckarooError::ConnectionTimeout {
            operation: "TransactionStatus".to_string(),
            timeout_ms: 30_000,
        };
        assert_eq!(err.code(), BuckarooErrorCode::ConnectionTimeout);
        assert!(err.is_retryable());

        let err = BuckarooError::SignatureMismatch {
            sent: None,
            generated: "abc".to_string(),
        };
        assert_eq!(err.code(), BuckarooErrorCode::SignatureMismatch);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_numeric_codes_are_stable() {
        assert_eq!(BuckarooErrorCode::Unimplemented as i32, 1000);
        assert_eq!(BuckarooErrorCode::InvalidResponse as i32, 2003);
        assert_eq!(BuckarooErrorCode::SignatureMismatch as i32, 3000);
        assert_eq!(BuckarooErrorCode::NonCancellable as i32, 4002);
        assert_eq!(BuckarooErrorCode::MissingParameter as i32, 5002);

        let err = BuckarooError::invalid_config("timeout", "abc");
        assert_eq!(err.code() as i32, 5000);
    }

    #[test]
    fn test_invalid_response_retryable_only_on_server_errors() {
        let server = BuckarooError::InvalidResponse {
            status: 502,
            reason: "Bad Gateway".to_string(),
        };
        let client = BuckarooError::InvalidResponse {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
    }

    #[test]
    fn test_signature_mismatch_display() {
        let err = BuckarooError::SignatureMismatch {
            sent: Some("1234".to_string()),
            generated: "abcd".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sent signature (1234) doesn't match generated signature (abcd)"
        );

        let err = BuckarooError::SignatureMismatch {
            sent: None,
            generated: "abcd".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sent signature () doesn't match generated signature (abcd)"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = BuckarooError::Api {
            status_code: Some("491".to_string()),
            status_message: Some("Validation failure".to_string()),
            error_message: None,
        };
        assert_eq!(
            err.to_string(),
            "API request failed: Validation failure (491)"
        );

        let err = BuckarooError::Api {
            status_code: None,
            status_message: None,
            error_message: Some("Invalid signature".to_string()),
        };
        assert_eq!(err.to_string(), "API request failed: Invalid signature");

        let err = BuckarooError::Api {
            status_code: None,
            status_message: None,
            error_message: None,
        };
        assert_eq!(err.to_string(), "API request failed");
    }

    #[test]
    fn test_helper_constructors() {
        let err = BuckarooError::invalid_argument("amount", "must be greater than 0");
        assert_eq!(err.code(), BuckarooErrorCode::InvalidArgument);
        assert_eq!(err.to_string(), "invalid amount: must be greater than 0");

        let err = BuckarooError::missing("invoicenumber");
        assert_eq!(err.code(), BuckarooErrorCode::MissingParameter);
        assert_eq!(err.to_string(), "missing required parameter: invoicenumber");
    }
}
