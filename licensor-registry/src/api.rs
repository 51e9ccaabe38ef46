//! Request and response shapes for a transport layer sitting on top of the
//! registry.
//!
//! These are plain serde types with camelCase field names. Mapping them to
//! status codes or routes is left to the caller.

use crate::entitlements::Entitlements;
use crate::error::LicenseResult;
use crate::key::LicenseKind;
use crate::license::License;
use crate::registry::{ActivationOutcome, LicenseInfo, Registry};
use serde::{Deserialize, Serialize};

/// Body of an issuance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub kind: LicenseKind,
    pub email: String,
    pub purchase_code: String,
}

/// Body of a validation/activation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub license_key: String,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Outcome of a validation/activation request.
///
/// `license_info` and `remaining_activations` are present only when `valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_info: Option<ValidatedLicense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_activations: Option<u32>,
}

/// License details attached to a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedLicense {
    pub license: License,
    pub features: Entitlements,
}

/// Body of a deactivation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateRequest {
    pub license_key: String,
    pub domain: String,
}

/// Outcome of a deactivation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateResponse {
    pub success: bool,
    pub message: String,
}

/// Outcome of a license lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LicenseInfoResponse {
    Found(LicenseInfo),
    NotFound,
}

/// Issues a license from a request body.
///
/// # Errors
///
/// Propagates [`Registry::issue`] errors.
pub fn handle_issue(registry: &Registry, req: &IssueRequest) -> LicenseResult<License> {
    registry.issue(req.kind, &req.email, &req.purchase_code)
}

/// Validates (and possibly activates) a key. Every registry error becomes an
/// invalid response carrying the error's message.
#[must_use]
pub fn handle_validate(registry: &Registry, req: &ValidateRequest) -> ValidateResponse {
    match registry.validate(&req.license_key, req.domain.as_deref()) {
        Ok(v) => {
            let message = match v.outcome {
                ActivationOutcome::StatusOnly => "License is valid",
                ActivationOutcome::AlreadyBound => "License is valid for this domain",
                ActivationOutcome::Activated => "License activated for this domain",
            };
            ValidateResponse {
                valid: true,
                message: message.to_string(),
                license_info: Some(ValidatedLicense {
                    license: v.license,
                    features: v.entitlements,
                }),
                remaining_activations: Some(v.remaining_activations),
            }
        }
        Err(e) => ValidateResponse {
            valid: false,
            message: capitalize(&e.to_string()),
            license_info: None,
            remaining_activations: None,
        },
    }
}

/// Unbinds a domain from a key.
#[must_use]
pub fn handle_deactivate(registry: &Registry, req: &DeactivateRequest) -> DeactivateResponse {
    if registry.deactivate(&req.license_key, &req.domain) {
        DeactivateResponse {
            success: true,
            message: "License deactivated for this domain".to_string(),
        }
    } else {
        DeactivateResponse {
            success: false,
            message: "License not found".to_string(),
        }
    }
}

/// Looks up a key's record and entitlements.
#[must_use]
pub fn handle_info(registry: &Registry, license_key: &str) -> LicenseInfoResponse {
    registry
        .describe(license_key)
        .map_or(LicenseInfoResponse::NotFound, LicenseInfoResponse::Found)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
