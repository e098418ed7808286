//! Error types for the BankCode client.
//!
//! Every failure surfaces as a [`BankCodeError`] whose variant names the
//! stage that failed: configuration, request construction, cancellation,
//! network transport, HTTP status, or response decoding. Nothing is
//! retried or recovered locally.
//!
//! # Examples
//!
//! ```
//! use bankcode_client::BankCodeError;
//!
//! let error = BankCodeError::Status {
//!     status_code: 404,
//!     reason: "Not Found".to_string(),
//! };
//! assert_eq!(error.stage(), "status");
//! assert_eq!(error.status_code(), Some(404));
//! ```

use thiserror::Error;

/// Error returned by every client operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankCodeError {
    /// A construction option was rejected.
    #[error("[Config] Invalid value for '{field}': {reason}")]
    Config {
        /// Option that was rejected.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request URL could not be parsed or the request could not be assembled.
    #[error("[Request] Invalid request for '{url}': {reason}")]
    InvalidUrl {
        /// URL (with the API key masked) that failed.
        url: String,
        /// Reason reported by the URL parser or request builder.
        reason: String,
    },

    /// The caller cancelled the operation before it completed.
    #[error("[Cancelled] Operation cancelled by caller")]
    Cancelled,

    /// The request could not be sent or the response could not be read.
    #[error("[Network] Request failed: {reason}")]
    Network {
        /// Reason reported by the transport.
        reason: String,
    },

    /// The server answered with a status other than 200.
    #[error("[Status] Invalid HTTP status: {status_code} {reason}")]
    Status {
        /// HTTP status code.
        status_code: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The response body did not match the expected JSON shape.
    #[error("[Decode] Failed to decode response: {reason}")]
    Decode {
        /// Reason reported by the JSON decoder.
        reason: String,
    },
}

impl BankCodeError {
    /// Creates a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::InvalidUrl { .. } => "request",
            Self::Cancelled => "cancelled",
            Self::Network { .. } => "network",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
        }
    }

    /// Returns the HTTP status code for status errors.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns true if the caller cancelled the operation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for BankCodeError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest embeds the full URL (apikey included) in its Display output.
        let reason = match err.url() {
            Some(url) => err
                .to_string()
                .replace(url.as_str(), &crate::masking::mask_url(url.as_str())),
            None => err.to_string(),
        };
        Self::Network { reason }
    }
}

impl From<serde_json::Error> for BankCodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            reason: err.to_string(),
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, BankCodeError>;
