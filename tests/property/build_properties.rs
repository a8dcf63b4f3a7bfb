// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Stack Composition
//!
//! Arbitrary combinations of feature flags, regions and allowlists are fed
//! through validation and the full build. Validation and construction must
//! agree, and a successful build must be deterministic and well ordered.

use proptest::prelude::*;

use cim_site_stack::outputs::{ACCESS_POLICY_ID, CUSTOM_URL, DEFAULT_URL};
use cim_site_stack::stack::distribution::check_disjoint;
use cim_site_stack::stack::validation::validate;
use cim_site_stack::stack::OVERLAYS;
use cim_site_stack::{
    ConfigurationError, SiteConfig, SiteStack, StackError, StaticZoneLookup, CDN_REGION,
};

// ============================================================================
// Strategies
// ============================================================================

fn region() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just(CDN_REGION.to_string()),
        1 => Just("eu-west-1".to_string()),
        1 => Just("ap-southeast-2".to_string()),
    ]
}

fn cert_arn() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("arn:aws:acm:us-east-1:111111111111:certificate/abc".to_string())),
    ]
}

fn allow_cidrs() -> impl Strategy<Value = Option<Vec<String>>> {
    prop::option::of(prop::collection::vec(
        (0u8..=255, 0u8..=255, 8u8..=32).prop_map(|(a, b, len)| format!("10.{}.{}.0/{}", a, b, len)),
        0..3,
    ))
}

prop_compose! {
    fn site_config()(
        use_custom_domain in any::<bool>(),
        create_cert in any::<bool>(),
        cert_arn in cert_arn(),
        create_waf_acl in any::<bool>(),
        allow_cidrs in allow_cidrs(),
        create_dns in any::<bool>(),
        region in region(),
    ) -> SiteConfig {
        SiteConfig {
            svc_name: "web-demo".to_string(),
            root_domain: "example.com".to_string(),
            hostname: "www".to_string(),
            use_custom_domain,
            create_cert,
            cert_arn,
            create_waf_acl,
            allow_cidrs,
            create_dns,
            region,
            ..Default::default()
        }
    }
}

fn zones() -> StaticZoneLookup {
    StaticZoneLookup::new().with_zone("example.com", "Z0123456789ABCDEFGHIJ")
}

/// First violated rule, evaluated independently of the library
fn expected_violation(config: &SiteConfig) -> Option<ConfigurationError> {
    let has_arn = config.cert_arn.as_deref().is_some_and(|arn| !arn.is_empty());
    let has_cidrs = config.allow_cidrs.as_ref().is_some_and(|cidrs| !cidrs.is_empty());
    let in_cdn_region = config.region == CDN_REGION;

    if config.use_custom_domain && !config.create_cert && !has_arn {
        Some(ConfigurationError::UseCustomDomainRequiresCertificate)
    } else if config.use_custom_domain && config.create_cert && !in_cdn_region {
        Some(ConfigurationError::CertificateRegionMismatch {
            region: config.region.clone(),
            required: CDN_REGION,
        })
    } else if config.create_waf_acl && !has_cidrs {
        Some(ConfigurationError::EmptyAllowList)
    } else if config.create_waf_acl && !in_cdn_region {
        Some(ConfigurationError::AccessPolicyRegionMismatch {
            region: config.region.clone(),
            required: CDN_REGION,
        })
    } else {
        None
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: validation reports the first violated rule in precedence order
    #[test]
    fn prop_validation_precedence(config in site_config()) {
        let result = validate(&config).err();
        prop_assert_eq!(result, expected_violation(&config));
    }

    /// Property: the build succeeds exactly when validation does
    #[test]
    fn prop_build_agrees_with_validation(config in site_config()) {
        match (SiteStack::build(&config, &zones()), expected_violation(&config)) {
            (Ok(_), None) => {}
            (Err(StackError::Configuration(actual)), Some(expected)) => {
                prop_assert_eq!(actual, expected)
            }
            (other, expected) => {
                prop_assert!(false, "build returned {:?}, expected {:?}", other.err(), expected)
            }
        }
    }

    /// Property: an access policy outside the CDN region fails with
    /// `AccessPolicyRegionMismatch` unless an earlier rule already fired
    #[test]
    fn prop_access_policy_region_enforced(mut config in site_config()) {
        config.create_waf_acl = true;
        config.region = "eu-west-1".to_string();

        let has_arn = config.cert_arn.as_deref().is_some_and(|arn| !arn.is_empty());
        let has_cidrs = config.allow_cidrs.as_ref().is_some_and(|cidrs| !cidrs.is_empty());
        let earlier_rule_fires = (config.use_custom_domain && (config.create_cert || !has_arn))
            || !has_cidrs;

        let err = SiteStack::build(&config, &zones()).err();
        if earlier_rule_fires {
            prop_assert!(
                matches!(err, Some(StackError::Configuration(ref e))
                    if !matches!(e, ConfigurationError::AccessPolicyRegionMismatch { .. })),
                "expected an earlier rule, got {:?}", err
            );
        } else {
            prop_assert!(
                matches!(
                    err,
                    Some(StackError::Configuration(ConfigurationError::AccessPolicyRegionMismatch {
                        ref region,
                        required: CDN_REGION,
                    })) if region == "eu-west-1"
                ),
                "expected AccessPolicyRegionMismatch, got {:?}", err
            );
        }
    }

    /// Property: building the same configuration twice gives equal stacks
    #[test]
    fn prop_build_is_deterministic(config in site_config()) {
        let first = SiteStack::build(&config, &zones()).ok();
        let second = SiteStack::build(&config, &zones()).ok();
        prop_assert_eq!(first, second);
    }

    /// Property: outputs follow the enabled features, in emission order
    #[test]
    fn prop_outputs_follow_features(config in site_config()) {
        if let Ok(stack) = SiteStack::build(&config, &zones()) {
            let mut expected = Vec::new();
            if config.create_waf_acl {
                expected.push(ACCESS_POLICY_ID);
            }
            expected.push(DEFAULT_URL);
            if config.use_custom_domain && config.create_dns {
                expected.push(CUSTOM_URL);
            }
            prop_assert_eq!(stack.outputs.names(), expected);
        }
    }

    /// Property: every dependency was added before its dependent
    #[test]
    fn prop_dependencies_precede_dependents(config in site_config()) {
        if let Ok(stack) = SiteStack::build(&config, &zones()) {
            let nodes = stack.graph.nodes();
            for (index, node) in nodes.iter().enumerate() {
                for dep in node.dependencies() {
                    let position = nodes.iter().position(|candidate| candidate.id() == dep);
                    prop_assert!(
                        matches!(position, Some(p) if p < index),
                        "{} depends on {} which is not earlier", node.id(), dep
                    );
                }
            }
        }
    }
}

#[test]
fn overlay_declarations_are_disjoint() {
    assert!(check_disjoint(&OVERLAYS).is_ok());
}
