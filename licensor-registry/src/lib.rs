//! License key issuance, activation and entitlements.
//!
//! This crate handles:
//! - Minting unguessable license keys tied to a purchase
//! - Validating keys and binding ("activating") them to domains
//! - Enforcing per-kind activation limits under concurrency
//! - Revocation and expiry
//! - Deriving the feature entitlements a key grants
//!
//! # Design Principles
//!
//! - **One owner**: a [`Registry`] value holds all state; there is no global
//!   instance. Hosts construct one and share it.
//! - **Atomic activations**: the capacity check and the bind happen under one
//!   lock, so limits hold under any interleaving.
//! - **Typed outcomes**: every rejection is a [`LicenseError`] variant; the
//!   crate never encodes transport concerns.
//! - **Terminal revocation**: no operation reinstates a revoked license.
//!
//! # License Kinds
//!
//! - `Regular`: one domain, locked for the lifetime of the license
//! - `Extended`: up to five simultaneously bound domains

pub mod api;
mod config;
mod entitlements;
mod error;
mod key;
mod license;
mod registry;

pub use config::{RegistryConfig, KEY_ENTROPY_RANGE};
pub use entitlements::{
    AiFeatures, DailyRequests, Entitlements, DEMO_DAILY_REQUESTS, REGULAR_DAILY_REQUESTS,
};
pub use error::{LicenseError, LicenseResult};
pub use key::{
    LicenseId, LicenseKey, LicenseKind, EXTENDED_MAX_ACTIVATIONS, REGULAR_MAX_ACTIVATIONS,
};
pub use license::{License, LicenseStatus};
pub use registry::{ActivationOutcome, LicenseInfo, Registry, Validation};
