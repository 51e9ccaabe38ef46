//! License identifiers, key minting and license kinds.
//!
//! Keys use the format: `{prefix}-{base64url(entropy)}`
//!
//! The entropy comes straight from the OS randomness source. Nothing about
//! the purchase (email, purchase code) feeds into a key, so one key reveals
//! nothing about any other.

use crate::error::{LicenseError, LicenseResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Activation limit of a [`LicenseKind::Regular`] license.
pub const REGULAR_MAX_ACTIVATIONS: u32 = 1;

/// Activation limit of a [`LicenseKind::Extended`] license.
pub const EXTENDED_MAX_ACTIVATIONS: u32 = 5;

/// Process-unique license identifier.
/// Uses UUID v7 so ids sort in issuance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseId(Uuid);

impl LicenseId {
    /// Creates a new license ID with the current timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LicenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LicenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LicenseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The kind of license purchased. Fixed at issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseKind {
    /// Single-domain license.
    Regular,
    /// Multi-domain license with commercial rights.
    Extended,
}

impl LicenseKind {
    /// Returns the maximum number of simultaneously bound domains.
    #[must_use]
    pub fn max_activations(&self) -> u32 {
        match self {
            Self::Regular => REGULAR_MAX_ACTIVATIONS,
            Self::Extended => EXTENDED_MAX_ACTIVATIONS,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for LicenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseKind {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "extended" => Ok(Self::Extended),
            other => Err(LicenseError::InvalidArgument(format!(
                "unknown license kind: {other}"
            ))),
        }
    }
}

/// An opaque license key.
///
/// Hashes and compares like its inner string, so maps keyed by
/// `LicenseKey` can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Mints a fresh key from `entropy_bytes` bytes of OS randomness.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Randomness`] if the OS randomness source fails.
    pub fn generate(prefix: &str, entropy_bytes: usize) -> LicenseResult<Self> {
        let mut bytes = vec![0u8; entropy_bytes];
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| LicenseError::Randomness(e.to_string()))?;

        Ok(Self(format!("{prefix}-{}", URL_SAFE_NO_PAD.encode(&bytes))))
    }

    /// Wraps an existing key string, trimming surrounding whitespace.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// Returns the raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, non-reversible tag for log lines (first 8 bytes of SHA-256, hex).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

impl Borrow<str> for LicenseKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprints a caller-supplied key string without wrapping it.
pub(crate) fn fingerprint(raw: &str) -> String {
    let hash = Sha256::digest(raw.as_bytes());
    hash[..8].iter().map(|b| format!("{b:02x}")).collect()
}
