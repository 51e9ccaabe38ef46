//! The license registry: authoritative in-memory store of every issued
//! license and the domains currently bound to each.
//!
//! All state lives behind a single mutex. Each operation holds the lock for
//! its whole read-check-write sequence, so two activations racing for the
//! last free slot of a license can never both succeed.

use crate::config::RegistryConfig;
use crate::entitlements::Entitlements;
use crate::error::{LicenseError, LicenseResult};
use crate::key::{fingerprint, LicenseKey, LicenseKind};
use crate::license::License;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Attempts at minting a key that collides with no existing license.
const MAX_KEY_ATTEMPTS: usize = 8;

/// What a successful validation did to the domain bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationOutcome {
    /// No domain was presented; status check only.
    StatusOnly,
    /// The domain was already bound; nothing changed.
    AlreadyBound,
    /// The domain was newly bound and consumed one slot.
    Activated,
}

/// Result of a successful [`Registry::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Snapshot of the license after the operation.
    pub license: License,
    /// Entitlements of the license after the operation.
    pub entitlements: Entitlements,
    /// Free activation slots after the operation.
    pub remaining_activations: u32,
    /// Effect on the domain bindings.
    pub outcome: ActivationOutcome,
}

/// A license record together with its current entitlements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub license: License,
    pub entitlements: Entitlements,
}

#[derive(Debug, Default)]
struct RegistryState {
    licenses: HashMap<LicenseKey, License>,
    /// Domain binding sets. An entry exists only while non-empty.
    domains: HashMap<LicenseKey, BTreeSet<String>>,
}

/// Issues, validates, activates and revokes licenses.
///
/// Construct one per process and share it (e.g. behind an `Arc`); every
/// method takes `&self`.
#[derive(Debug, Default)]
pub struct Registry {
    config: RegistryConfig,
    state: Mutex<RegistryState>,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidArgument`] if the configuration is invalid.
    pub fn with_config(config: RegistryConfig) -> LicenseResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: Mutex::new(RegistryState::default()),
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Issues a new license. Expiry follows `defaultValidityDays`, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidArgument`] for a blank email or purchase
    /// code, and [`LicenseError::Randomness`] / [`LicenseError::KeyExhausted`]
    /// if no key could be minted.
    pub fn issue(
        &self,
        kind: LicenseKind,
        email: &str,
        purchase_code: &str,
    ) -> LicenseResult<License> {
        let now = Utc::now();
        let expires_at = self
            .config
            .default_validity_days
            .map(|days| now + Duration::days(i64::from(days)));
        self.insert_new(kind, email, purchase_code, now, expires_at)
    }

    /// Issues a new license with an explicit expiry (or none).
    ///
    /// An expiry in the past is accepted; such a license never validates.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::issue`].
    pub fn issue_with_expiry(
        &self,
        kind: LicenseKind,
        email: &str,
        purchase_code: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> LicenseResult<License> {
        self.insert_new(kind, email, purchase_code, Utc::now(), expires_at)
    }

    fn insert_new(
        &self,
        kind: LicenseKind,
        email: &str,
        purchase_code: &str,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> LicenseResult<License> {
        let email = required("email", email)?;
        let purchase_code = required("purchase code", purchase_code)?;

        let mut state = self.lock();
        let key = self.mint_unique_key(&state)?;
        let license = License::new(key.clone(), kind, email, purchase_code, now, expires_at);
        state.licenses.insert(key.clone(), license.clone());

        info!(
            license_id = %license.id(),
            key = %key.fingerprint(),
            kind = %kind,
            expires_at = ?expires_at,
            "License issued"
        );
        Ok(license)
    }

    fn mint_unique_key(&self, state: &RegistryState) -> LicenseResult<LicenseKey> {
        for _ in 0..MAX_KEY_ATTEMPTS {
            let key =
                LicenseKey::generate(&self.config.key_prefix, self.config.key_entropy_bytes)?;
            if !state.licenses.contains_key(&key) {
                return Ok(key);
            }
            warn!("Minted license key collided with an existing one, retrying");
        }
        Err(LicenseError::KeyExhausted)
    }

    /// Validates a key and, if `domain` is given, activates it for that domain.
    ///
    /// Checks run in order: existence, revocation, expiry. Without a domain
    /// (or with a blank one) the call is a pure status check. A domain that
    /// is already bound is accepted without consuming capacity. A new domain
    /// is bound only if the kind's policy allows it.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::NotFound`], [`LicenseError::Revoked`],
    /// [`LicenseError::Expired`], [`LicenseError::DomainConflict`] or
    /// [`LicenseError::CapacityExceeded`] when the key is rejected.
    pub fn validate(&self, key: &str, domain: Option<&str>) -> LicenseResult<Validation> {
        let domain = domain
            .map(|d| self.canonical_domain(d))
            .filter(|d| !d.is_empty());
        let key = key.trim();
        let now = Utc::now();

        let mut guard = self.lock();
        let state = &mut *guard;

        let Some(license) = state.licenses.get_mut(key) else {
            debug!(key = %fingerprint(key), "Validation of unknown license key");
            return Err(LicenseError::NotFound);
        };
        if !license.is_active() {
            debug!(license_id = %license.id(), "Validation of revoked license");
            return Err(LicenseError::Revoked);
        }
        if let Some(expired) = license.expires_at().filter(|exp| *exp <= now) {
            debug!(
                license_id = %license.id(),
                expired_at = %expired,
                "Validation of expired license"
            );
            return Err(LicenseError::Expired(expired));
        }

        let outcome = match domain {
            None => ActivationOutcome::StatusOnly,
            Some(domain) => {
                let bound = state.domains.get(key);
                if bound.is_some_and(|set| set.contains(&domain)) {
                    ActivationOutcome::AlreadyBound
                } else {
                    let in_use = bound.map_or(0, BTreeSet::len);
                    check_new_binding(license, &domain, in_use)?;

                    let set = state.domains.entry(license.key().clone()).or_default();
                    set.insert(domain.clone());
                    license.record_activation(&domain, now);
                    license.set_activation_count(set_len(set));

                    info!(
                        license_id = %license.id(),
                        domain = %domain,
                        activations = license.activation_count(),
                        max_activations = license.max_activations(),
                        "License activated"
                    );
                    ActivationOutcome::Activated
                }
            }
        };

        Ok(Validation {
            license: license.clone(),
            entitlements: Entitlements::for_kind(license.kind()),
            remaining_activations: license.remaining_activations(),
            outcome,
        })
    }

    /// Unbinds `domain` from the license.
    ///
    /// Returns false if the key is unknown and true otherwise, including when
    /// the domain was not bound. A Regular license keeps its domain lock.
    pub fn deactivate(&self, key: &str, domain: &str) -> bool {
        let domain = self.canonical_domain(domain);
        let key = key.trim();

        let mut guard = self.lock();
        let state = &mut *guard;

        let Some(license) = state.licenses.get_mut(key) else {
            debug!(key = %fingerprint(key), "Deactivation of unknown license key");
            return false;
        };

        let Some(set) = state.domains.get_mut(key) else {
            return true;
        };
        if set.remove(&domain) {
            license.set_activation_count(set_len(set));
            info!(
                license_id = %license.id(),
                domain = %domain,
                activations = license.activation_count(),
                "License deactivated"
            );
        }
        if set.is_empty() {
            state.domains.remove(key);
        }
        true
    }

    /// Revokes the license and forgets all of its domain bindings.
    ///
    /// Idempotent and terminal. Returns false only if the key is unknown.
    pub fn revoke(&self, key: &str) -> bool {
        let key = key.trim();

        let mut guard = self.lock();
        let state = &mut *guard;

        let Some(license) = state.licenses.get_mut(key) else {
            debug!(key = %fingerprint(key), "Revocation of unknown license key");
            return false;
        };

        let released = state.domains.remove(key).map_or(0, |set| set.len());
        if license.is_active() {
            info!(license_id = %license.id(), released, "License revoked");
        }
        license.revoke();
        true
    }

    /// Returns a snapshot of the license, or None for an unknown key.
    #[must_use]
    pub fn get_info(&self, key: &str) -> Option<License> {
        self.lock().licenses.get(key.trim()).cloned()
    }

    /// Returns the license and its entitlements from one consistent snapshot.
    #[must_use]
    pub fn describe(&self, key: &str) -> Option<LicenseInfo> {
        let state = self.lock();
        let license = state.licenses.get(key.trim())?.clone();
        let entitlements = Entitlements::resolve(Some(&license));
        Some(LicenseInfo { license, entitlements })
    }

    /// Returns every license, revoked ones included, in issuance order.
    #[must_use]
    pub fn list_all(&self) -> Vec<License> {
        let mut all: Vec<License> = self.lock().licenses.values().cloned().collect();
        all.sort_by_key(License::id);
        all
    }

    /// Returns the entitlements the key currently grants.
    /// Unknown and revoked keys get the demo tier.
    #[must_use]
    pub fn entitlements(&self, key: &str) -> Entitlements {
        let state = self.lock();
        Entitlements::resolve(state.licenses.get(key.trim()))
    }

    /// Returns the currently bound domains in sorted order,
    /// or None for an unknown key.
    #[must_use]
    pub fn bound_domains(&self, key: &str) -> Option<Vec<String>> {
        let key = key.trim();
        let state = self.lock();
        if !state.licenses.contains_key(key) {
            return None;
        }
        Some(
            state
                .domains
                .get(key)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default(),
        )
    }

    /// Returns the number of licenses ever issued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().licenses.len()
    }

    /// Returns true if no license has been issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn canonical_domain(&self, domain: &str) -> String {
        let trimmed = domain.trim();
        if !self.config.normalize_domains {
            return trimmed.to_string();
        }
        let lowered = trimmed.to_ascii_lowercase();
        match lowered.strip_suffix('.') {
            Some(stripped) => stripped.to_string(),
            None => lowered,
        }
    }

    // Every mutation completes before the guard drops, so a poisoned lock
    // still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Applies the kind's activation policy to a domain not yet bound.
fn check_new_binding(license: &License, domain: &str, in_use: usize) -> LicenseResult<()> {
    if license.kind() == LicenseKind::Regular {
        let locked_elsewhere = license.bound_domain().is_some_and(|b| b != domain);
        if in_use > 0 || locked_elsewhere {
            warn!(
                license_id = %license.id(),
                domain = %domain,
                "Regular license activation rejected: bound to another domain"
            );
            return Err(LicenseError::DomainConflict);
        }
    }

    let max = license.max_activations();
    if in_use >= max as usize {
        warn!(
            license_id = %license.id(),
            domain = %domain,
            max_activations = max,
            "License activation rejected: capacity exhausted"
        );
        return Err(LicenseError::CapacityExceeded(max));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> LicenseResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LicenseError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn set_len(set: &BTreeSet<String>) -> u32 {
    u32::try_from(set.len()).unwrap_or(u32::MAX)
}
