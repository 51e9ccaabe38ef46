//! The license record.

use crate::key::{LicenseId, LicenseKey, LicenseKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived state of a license at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// License is usable.
    Active,
    /// License passed its expiry.
    Expired,
    /// License was revoked. Terminal.
    Revoked,
}

impl LicenseStatus {
    /// Returns true if the license may be validated and activated.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A snapshot of an issued license.
///
/// Records handed out by the registry are copies; mutating state happens only
/// through registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    id: LicenseId,
    key: LicenseKey,
    email: String,
    purchase_code: String,
    kind: LicenseKind,
    bound_domain: Option<String>,
    activated_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    activation_count: u32,
    max_activations: u32,
    created_at: DateTime<Utc>,
}

impl License {
    pub(crate) fn new(
        key: LicenseKey,
        kind: LicenseKind,
        email: String,
        purchase_code: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: LicenseId::new(),
            key,
            email,
            purchase_code,
            kind,
            bound_domain: None,
            activated_at: None,
            expires_at,
            is_active: true,
            activation_count: 0,
            max_activations: kind.max_activations(),
            created_at,
        }
    }

    /// Returns the license ID.
    #[must_use]
    pub fn id(&self) -> LicenseId {
        self.id
    }

    /// Returns the license key.
    #[must_use]
    pub fn key(&self) -> &LicenseKey {
        &self.key
    }

    /// Returns the purchaser email recorded at issuance.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the purchase code recorded at issuance.
    #[must_use]
    pub fn purchase_code(&self) -> &str {
        &self.purchase_code
    }

    /// Returns the license kind.
    #[must_use]
    pub fn kind(&self) -> LicenseKind {
        self.kind
    }

    /// Returns the domain a Regular license is locked to, if it was ever activated.
    #[must_use]
    pub fn bound_domain(&self) -> Option<&str> {
        self.bound_domain.as_deref()
    }

    /// Returns the time of the first successful activation.
    #[must_use]
    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activated_at
    }

    /// Returns the absolute expiry, or None if the license never expires.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns false once the license has been revoked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the number of currently bound domains.
    #[must_use]
    pub fn activation_count(&self) -> u32 {
        self.activation_count
    }

    /// Returns the activation capacity.
    #[must_use]
    pub fn max_activations(&self) -> u32 {
        self.max_activations
    }

    /// Returns the issuance timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the number of free activation slots.
    #[must_use]
    pub fn remaining_activations(&self) -> u32 {
        self.max_activations.saturating_sub(self.activation_count)
    }

    /// Returns true if the expiry is set and not after `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Returns the license status at `now`. Revocation wins over expiry.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> LicenseStatus {
        if !self.is_active {
            LicenseStatus::Revoked
        } else if self.is_expired_at(now) {
            LicenseStatus::Expired
        } else {
            LicenseStatus::Active
        }
    }

    /// Returns the license status right now.
    #[must_use]
    pub fn status(&self) -> LicenseStatus {
        self.status_at(Utc::now())
    }

    pub(crate) fn record_activation(&mut self, domain: &str, now: DateTime<Utc>) {
        if self.kind == LicenseKind::Regular && self.bound_domain.is_none() {
            self.bound_domain = Some(domain.to_string());
        }
        if self.activated_at.is_none() {
            self.activated_at = Some(now);
        }
    }

    pub(crate) fn set_activation_count(&mut self, count: u32) {
        self.activation_count = count;
    }

    pub(crate) fn revoke(&mut self) {
        self.is_active = false;
        self.activation_count = 0;
    }
}
