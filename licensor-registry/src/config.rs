//! Registry configuration.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted range for [`RegistryConfig::key_entropy_bytes`].
pub const KEY_ENTROPY_RANGE: RangeInclusive<usize> = 16..=64;

/// Tunables for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// ASCII alphanumeric prefix of minted keys.
    pub key_prefix: String,
    /// Random bytes per key.
    pub key_entropy_bytes: usize,
    /// When set, issuance stamps an expiry this many days after creation.
    pub default_validity_days: Option<u32>,
    /// Trim, lowercase and strip one trailing dot from domains.
    pub normalize_domains: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            key_prefix: "LK".to_string(),
            key_entropy_bytes: 20,
            default_validity_days: None,
            normalize_domains: true,
        }
    }
}

impl RegistryConfig {
    /// Parses a JSON configuration document and validates it.
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> LicenseResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field is within its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> LicenseResult<()> {
        let prefix_ok = !self.key_prefix.is_empty()
            && self.key_prefix.chars().all(|c| c.is_ascii_alphanumeric());
        if !prefix_ok {
            return Err(LicenseError::InvalidArgument(format!(
                "keyPrefix must be non-empty ASCII alphanumeric, got {:?}",
                self.key_prefix
            )));
        }

        if !KEY_ENTROPY_RANGE.contains(&self.key_entropy_bytes) {
            return Err(LicenseError::InvalidArgument(format!(
                "keyEntropyBytes must be within {}..={}, got {}",
                KEY_ENTROPY_RANGE.start(),
                KEY_ENTROPY_RANGE.end(),
                self.key_entropy_bytes
            )));
        }

        if self.default_validity_days == Some(0) {
            return Err(LicenseError::InvalidArgument(
                "defaultValidityDays must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
