//! Shared test helpers for registry tests.

#![allow(dead_code)]

use licensor_registry::{License, LicenseKind, Registry};
use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Issues a license with fixed provenance fields.
pub fn issue(registry: &Registry, kind: LicenseKind) -> License {
    registry
        .issue(kind, "buyer@example.com", "PC-0001")
        .expect("issuance should succeed")
}

/// Returns a fresh registry with one Regular license.
pub fn regular() -> (Registry, String) {
    init_tracing();
    let registry = Registry::new();
    let key = issue(&registry, LicenseKind::Regular).key().to_string();
    (registry, key)
}

/// Returns a fresh registry with one Extended license.
pub fn extended() -> (Registry, String) {
    init_tracing();
    let registry = Registry::new();
    let key = issue(&registry, LicenseKind::Extended).key().to_string();
    (registry, key)
}
