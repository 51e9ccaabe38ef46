//! Error types for the license registry.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// License registry errors.
///
/// The first five variants are expected outcomes of validating a key and are
/// reported to callers as rejections. The remaining variants are operational
/// failures of the call itself.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// No license exists for the presented key.
    #[error("license not found")]
    NotFound,

    /// License has been revoked.
    #[error("license has been revoked")]
    Revoked,

    /// License has expired.
    #[error("license expired on {0}")]
    Expired(DateTime<Utc>),

    /// Regular license is already bound to a different domain.
    #[error("license is already activated on another domain")]
    DomainConflict,

    /// Extended license has no free activation slot.
    #[error("activation limit reached (max {0} domains)")]
    CapacityExceeded(u32),

    /// Caller supplied malformed input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The OS randomness source failed while minting a key.
    #[error("randomness unavailable: {0}")]
    Randomness(String),

    /// Every freshly minted key collided with an existing one.
    #[error("could not mint a unique license key")]
    KeyExhausted,

    /// Configuration JSON is malformed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LicenseError {
    /// Returns true if this error is a validation verdict on the license
    /// rather than a failure of the operation itself.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::Revoked
                | Self::Expired(_)
                | Self::DomainConflict
                | Self::CapacityExceeded(_)
        )
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
