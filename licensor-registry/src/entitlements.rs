//! Feature entitlements derived from a license's kind and state.
//!
//! | state            | ai        | daily     | brand | support | commercial | projects | white |
//! |------------------|-----------|-----------|-------|---------|------------|----------|-------|
//! | unknown/revoked  | demo      | 5         | no    | no      | no         | -        | -     |
//! | Regular, active  | full      | 100       | yes   | yes     | no         | no       | -     |
//! | Extended, active | unlimited | unlimited | yes   | yes     | yes        | yes      | yes   |
//!
//! Expiry does not change the row; it only makes validation fail.
//! `-` means the flag is absent from the set, not false.

use crate::key::LicenseKind;
use crate::license::License;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Daily request allowance for the demo tier.
pub const DEMO_DAILY_REQUESTS: u32 = 5;

/// Daily request allowance for a Regular license.
pub const REGULAR_DAILY_REQUESTS: u32 = 100;

/// Level of AI feature access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiFeatures {
    Demo,
    Full,
    Unlimited,
}

/// Daily request quota. Serializes as a number or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyRequests {
    Limited(u32),
    Unlimited,
}

impl Serialize for DailyRequests {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limited(n) => serializer.serialize_u32(*n),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for DailyRequests {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(Self::Limited(n)),
            Raw::Word(w) if w == "unlimited" => Ok(Self::Unlimited),
            Raw::Word(w) => Err(serde::de::Error::custom(format!(
                "expected a number or \"unlimited\", got {w:?}"
            ))),
        }
    }
}

/// The feature-flag bundle a caller gates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlements {
    pub ai_features: AiFeatures,
    pub daily_requests: DailyRequests,
    pub custom_branding: bool,
    pub priority_support: bool,
    pub commercial_use: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_projects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_label: Option<bool>,
}

impl Entitlements {
    /// Entitlements for an unknown or revoked key.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            ai_features: AiFeatures::Demo,
            daily_requests: DailyRequests::Limited(DEMO_DAILY_REQUESTS),
            custom_branding: false,
            priority_support: false,
            commercial_use: false,
            multiple_projects: None,
            white_label: None,
        }
    }

    /// Entitlements for an active license of the given kind.
    #[must_use]
    pub fn for_kind(kind: LicenseKind) -> Self {
        match kind {
            LicenseKind::Regular => Self {
                ai_features: AiFeatures::Full,
                daily_requests: DailyRequests::Limited(REGULAR_DAILY_REQUESTS),
                custom_branding: true,
                priority_support: true,
                commercial_use: false,
                multiple_projects: Some(false),
                white_label: None,
            },
            LicenseKind::Extended => Self {
                ai_features: AiFeatures::Unlimited,
                daily_requests: DailyRequests::Unlimited,
                custom_branding: true,
                priority_support: true,
                commercial_use: true,
                multiple_projects: Some(true),
                white_label: Some(true),
            },
        }
    }

    /// Resolves entitlements for an optional license.
    #[must_use]
    pub fn resolve(license: Option<&License>) -> Self {
        match license {
            Some(l) if l.is_active() => Self::for_kind(l.kind()),
            _ => Self::demo(),
        }
    }
}
