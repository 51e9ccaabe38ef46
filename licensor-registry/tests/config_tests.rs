use licensor_registry::{LicenseError, Registry, RegistryConfig};
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = RegistryConfig::default();
    assert_eq!(config.key_prefix, "LK");
    assert_eq!(config.key_entropy_bytes, 20);
    assert_eq!(config.default_validity_days, None);
    assert!(config.normalize_domains);
    assert!(config.validate().is_ok());
}

#[test]
fn from_json_fills_missing_fields() {
    let config = RegistryConfig::from_json(r#"{"keyPrefix":"ACME","defaultValidityDays":365}"#)
        .unwrap();
    assert_eq!(
        config,
        RegistryConfig {
            key_prefix: "ACME".to_string(),
            default_validity_days: Some(365),
            ..RegistryConfig::default()
        }
    );
}

#[test]
fn from_json_empty_object_is_default() {
    assert_eq!(RegistryConfig::from_json("{}").unwrap(), RegistryConfig::default());
}

#[test]
fn from_json_malformed() {
    let err = RegistryConfig::from_json("{not json").unwrap_err();
    assert!(matches!(err, LicenseError::Serialization(_)));
}

#[test]
fn rejects_bad_prefix() {
    for prefix in ["", "L-K", "ключ"] {
        let json = format!(r#"{{"keyPrefix":"{prefix}"}}"#);
        let err = RegistryConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, LicenseError::InvalidArgument(_)), "prefix {prefix:?}");
    }
}

#[test]
fn rejects_entropy_out_of_range() {
    for bytes in [0, 15, 65] {
        let config = RegistryConfig {
            key_entropy_bytes: bytes,
            ..RegistryConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(Registry::with_config(config).is_err());
    }
}

#[test]
fn rejects_zero_validity() {
    let err = RegistryConfig::from_json(r#"{"defaultValidityDays":0}"#).unwrap_err();
    assert!(matches!(err, LicenseError::InvalidArgument(_)));
}

#[test]
fn registry_exposes_config() {
    let config = RegistryConfig {
        key_entropy_bytes: 32,
        ..RegistryConfig::default()
    };
    let registry = Registry::with_config(config.clone()).unwrap();
    assert_eq!(registry.config(), &config);
}
