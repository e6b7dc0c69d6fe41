//! Error handling for the Arweave uploader
//!
//! This module defines the error taxonomy shared by the price oracle, the
//! wallet adapters, the transaction pipeline and the session controller, and
//! the serializable [`ErrorInfo`] form the controller exposes to presentation.

use crate::upload::session::Phase;
use crate::wallet::types::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, UploadError>;

/// Error types that can occur while pricing, connecting or uploading
#[derive(Error, Debug)]
pub enum UploadError {
    /// The network price read failed or timed out
    #[error("Price unavailable: {message}")]
    PriceUnavailable { message: String },

    /// The provider's injected global is absent
    #[error("{provider} is not installed")]
    ProviderNotInstalled { provider: ProviderKind },

    /// The provider's consent flow was declined
    #[error("{provider} request rejected: {message}")]
    UserRejected {
        provider: ProviderKind,
        message: String,
    },

    /// The provider failed for a reason other than a user rejection
    #[error("{provider} error: {message}")]
    ProviderFailed {
        provider: ProviderKind,
        message: String,
    },

    /// The connected wallet cannot sign network transactions
    #[error("{provider} cannot sign Arweave transactions")]
    UnsupportedSigner { provider: ProviderKind },

    /// Signing was rejected or the wallet failed while signing
    #[error("Signing failed: {message}")]
    SigningFailed { message: String },

    /// Submitting the signed transaction failed
    #[error("Broadcast failed: {message}")]
    BroadcastFailed {
        message: String,
        status: Option<u16>,
    },

    /// The file exceeds the configured payload limit
    #[error("Payload too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// A network read needed to build the transaction failed
    #[error("Network request failed: {operation} - {message}")]
    Network { operation: String, message: String },

    /// An in-flight operation was abandoned before it finished
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// The command is not allowed in the current session phase
    #[error("Cannot {operation} while {phase}")]
    InvalidState { operation: String, phase: Phase },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid parameter
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploadError {
    /// Create a new price unavailable error
    pub fn price_unavailable(message: impl Into<String>) -> Self {
        UploadError::PriceUnavailable {
            message: message.into(),
        }
    }

    /// Create a new provider not installed error
    pub fn provider_not_installed(provider: ProviderKind) -> Self {
        UploadError::ProviderNotInstalled { provider }
    }

    /// Create a new user rejected error
    pub fn user_rejected(provider: ProviderKind, message: impl Into<String>) -> Self {
        UploadError::UserRejected {
            provider,
            message: message.into(),
        }
    }

    /// Create a new provider failure error
    pub fn provider_failed(provider: ProviderKind, message: impl Into<String>) -> Self {
        UploadError::ProviderFailed {
            provider,
            message: message.into(),
        }
    }

    /// Create a new unsupported signer error
    pub fn unsupported_signer(provider: ProviderKind) -> Self {
        UploadError::UnsupportedSigner { provider }
    }

    /// Create a new signing error
    pub fn signing_failed(message: impl Into<String>) -> Self {
        UploadError::SigningFailed {
            message: message.into(),
        }
    }

    /// Create a new broadcast error
    pub fn broadcast_failed(message: impl Into<String>, status: Option<u16>) -> Self {
        UploadError::BroadcastFailed {
            message: message.into(),
            status,
        }
    }

    /// Create a new payload too large error
    pub fn payload_too_large(size: u64, limit: u64) -> Self {
        UploadError::PayloadTooLarge { size, limit }
    }

    /// Create a new network error
    pub fn network(operation: impl Into<String>, message: impl Into<String>) -> Self {
        UploadError::Network {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a new cancelled error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        UploadError::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a new invalid state error
    pub fn invalid_state(operation: impl Into<String>, phase: Phase) -> Self {
        UploadError::InvalidState {
            operation: operation.into(),
            phase,
        }
    }

    /// Create a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        UploadError::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        UploadError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// The classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::PriceUnavailable { .. } => ErrorKind::PriceUnavailable,
            UploadError::ProviderNotInstalled { .. } => ErrorKind::ProviderNotInstalled,
            UploadError::UserRejected { .. } => ErrorKind::UserRejected,
            UploadError::ProviderFailed { .. } => ErrorKind::ProviderFailed,
            UploadError::UnsupportedSigner { .. } => ErrorKind::UnsupportedSigner,
            UploadError::SigningFailed { .. } => ErrorKind::SigningFailed,
            UploadError::BroadcastFailed { .. } => ErrorKind::BroadcastFailed,
            UploadError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            UploadError::Network { .. } => ErrorKind::Network,
            UploadError::Cancelled { .. } => ErrorKind::Cancelled,
            UploadError::InvalidState { .. } => ErrorKind::InvalidState,
            UploadError::ConfigError { .. } => ErrorKind::Config,
            UploadError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            UploadError::Io(_) => ErrorKind::Io,
            UploadError::Json(_) => ErrorKind::Json,
        }
    }

    /// Whether retrying the same command may succeed without user changes
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::PriceUnavailable | ErrorKind::BroadcastFailed | ErrorKind::Network
        )
    }
}

/// Classification of an [`UploadError`], stable across the presentation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PriceUnavailable,
    ProviderNotInstalled,
    UserRejected,
    ProviderFailed,
    UnsupportedSigner,
    SigningFailed,
    BroadcastFailed,
    PayloadTooLarge,
    Network,
    Cancelled,
    InvalidState,
    Config,
    InvalidParameter,
    Io,
    Json,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::PriceUnavailable => "price_unavailable",
            ErrorKind::ProviderNotInstalled => "provider_not_installed",
            ErrorKind::UserRejected => "user_rejected",
            ErrorKind::ProviderFailed => "provider_failed",
            ErrorKind::UnsupportedSigner => "unsupported_signer",
            ErrorKind::SigningFailed => "signing_failed",
            ErrorKind::BroadcastFailed => "broadcast_failed",
            ErrorKind::PayloadTooLarge => "payload_too_large",
            ErrorKind::Network => "network",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Config => "config",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// The last error of a session, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&UploadError> for ErrorInfo {
    fn from(err: &UploadError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
