//! Property-based tests for registry invariants.
//!
//! Random sequences of validate/deactivate/revoke calls must preserve:
//! - activation count == size of the domain binding set
//! - activation count <= max activations
//! - a Regular license never leaves its first domain
//! - revoked licenses stay empty and invalid

use licensor_registry::{LicenseError, LicenseKind, Registry};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Validate(Option<u8>),
    Deactivate(u8),
    Revoke,
}

fn kind_strategy() -> impl Strategy<Value = LicenseKind> {
    prop_oneof![Just(LicenseKind::Regular), Just(LicenseKind::Extended)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => proptest::option::of(0u8..8).prop_map(Op::Validate),
        3 => (0u8..8).prop_map(Op::Deactivate),
        1 => Just(Op::Revoke),
    ]
}

fn domain(i: u8) -> String {
    format!("d{i}.example")
}

proptest! {
    #[test]
    fn invariants_hold_for_any_sequence(
        kind in kind_strategy(),
        ops in proptest::collection::vec(op_strategy(), 0..40),
    ) {
        let registry = Registry::new();
        let key = registry.issue(kind, "p@example.com", "PC").unwrap().key().to_string();
        let mut first_domain: Option<String> = None;
        let mut revoked = false;

        for op in ops {
            match op {
                Op::Validate(d) => {
                    let d = d.map(domain);
                    let result = registry.validate(&key, d.as_deref());
                    if revoked {
                        prop_assert!(matches!(result, Err(LicenseError::Revoked)));
                    }
                    if let (Ok(_), Some(d)) = (&result, &d) {
                        if kind == LicenseKind::Regular {
                            let first = first_domain.get_or_insert_with(|| d.clone());
                            prop_assert_eq!(first.as_str(), d.as_str());
                        }
                    }
                    if let Err(LicenseError::DomainConflict) = result {
                        prop_assert_eq!(kind, LicenseKind::Regular);
                    }
                }
                Op::Deactivate(d) => {
                    prop_assert!(registry.deactivate(&key, &domain(d)));
                }
                Op::Revoke => {
                    prop_assert!(registry.revoke(&key));
                    revoked = true;
                }
            }

            let license = registry.get_info(&key).unwrap();
            let bound = registry.bound_domains(&key).unwrap();
            prop_assert_eq!(license.activation_count() as usize, bound.len());
            prop_assert!(license.activation_count() <= license.max_activations());
            prop_assert_eq!(license.is_active(), !revoked);
            if revoked {
                prop_assert!(bound.is_empty());
            }
            if kind == LicenseKind::Regular {
                prop_assert_eq!(license.bound_domain().map(str::to_string), first_domain.clone());
            }
        }
    }

    #[test]
    fn extended_accepts_exactly_capacity_distinct_domains(n in 0usize..12) {
        let registry = Registry::new();
        let key = registry
            .issue(LicenseKind::Extended, "p@example.com", "PC")
            .unwrap()
            .key()
            .to_string();

        let accepted = (0..n)
            .filter(|i| registry.validate(&key, Some(&format!("s{i}.example"))).is_ok())
            .count();
        prop_assert_eq!(accepted, n.min(5));
    }

    #[test]
    fn revalidation_never_consumes_capacity(repeats in 1usize..10) {
        let registry = Registry::new();
        let key = registry
            .issue(LicenseKind::Regular, "p@example.com", "PC")
            .unwrap()
            .key()
            .to_string();

        for _ in 0..repeats {
            let v = registry.validate(&key, Some("a.example")).unwrap();
            prop_assert_eq!(v.license.activation_count(), 1);
            prop_assert_eq!(v.remaining_activations, 0);
        }
    }
}
