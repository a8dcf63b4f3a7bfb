// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Preconditions
//!
//! Pure cross-field checks run before any resource node is created. Rules
//! are evaluated in a fixed precedence and the first violation wins:
//!
//! 1. Custom domain needs a certificate (created or referenced)
//! 2. A created certificate must live in the CDN region
//! 3. An access policy needs a non-empty allowlist
//! 4. An access policy must live in the CDN region
//!
//! Domain names are not checked: an empty `hostname` or `rootDomain` is
//! composed as-is into the alias and certificate pattern.

use crate::config::{SiteConfig, CDN_REGION};
use crate::errors::ConfigurationError;

/// Check every precedence rule, returning the configuration unchanged
pub fn validate(config: &SiteConfig) -> Result<&SiteConfig, ConfigurationError> {
    validate_certificate_source(config)?;
    validate_certificate_region(config)?;
    validate_allow_list(config)?;
    validate_access_policy_region(config)?;
    Ok(config)
}

/// Rule 1
pub fn validate_certificate_source(config: &SiteConfig) -> Result<(), ConfigurationError> {
    if config.use_custom_domain && !config.create_cert && config.cert_arn().is_none() {
        return Err(ConfigurationError::UseCustomDomainRequiresCertificate);
    }
    Ok(())
}

/// Rule 2
pub fn validate_certificate_region(config: &SiteConfig) -> Result<(), ConfigurationError> {
    if config.use_custom_domain && config.create_cert && config.region != CDN_REGION {
        return Err(ConfigurationError::CertificateRegionMismatch {
            region: config.region.clone(),
            required: CDN_REGION,
        });
    }
    Ok(())
}

/// Rule 3
pub fn validate_allow_list(config: &SiteConfig) -> Result<(), ConfigurationError> {
    if config.create_waf_acl && config.allow_cidrs().is_empty() {
        return Err(ConfigurationError::EmptyAllowList);
    }
    Ok(())
}

/// Rule 4
pub fn validate_access_policy_region(config: &SiteConfig) -> Result<(), ConfigurationError> {
    if config.create_waf_acl && config.region != CDN_REGION {
        return Err(ConfigurationError::AccessPolicyRegionMismatch {
            region: config.region.clone(),
            required: CDN_REGION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SiteConfig {
        SiteConfig {
            svc_name: "web-demo".to_string(),
            root_domain: "example.com".to_string(),
            hostname: "www".to_string(),
            region: CDN_REGION.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_config_passes_unchanged() {
        let config = base();
        assert_eq!(validate(&config), Ok(&config));
    }

    #[test]
    fn test_custom_domain_requires_certificate() {
        let config = SiteConfig {
            use_custom_domain: true,
            cert_arn: Some(String::new()),
            ..base()
        };
        assert_eq!(
            validate(&config),
            Err(ConfigurationError::UseCustomDomainRequiresCertificate)
        );
    }

    #[test]
    fn test_referenced_certificate_ignores_region() {
        let config = SiteConfig {
            use_custom_domain: true,
            cert_arn: Some("arn:aws:acm:us-east-1:1:certificate/x".to_string()),
            region: "eu-west-1".to_string(),
            ..base()
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_created_certificate_region() {
        let config = SiteConfig {
            use_custom_domain: true,
            create_cert: true,
            region: "eu-west-1".to_string(),
            ..base()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigurationError::CertificateRegionMismatch { .. })
        ));
    }

    #[test]
    fn test_create_cert_without_custom_domain_is_ignored() {
        let config = SiteConfig {
            create_cert: true,
            region: "eu-west-1".to_string(),
            ..base()
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_allow_list_precedes_region() {
        let config = SiteConfig {
            create_waf_acl: true,
            allow_cidrs: Some(vec![]),
            region: "eu-west-1".to_string(),
            ..base()
        };
        assert_eq!(validate(&config), Err(ConfigurationError::EmptyAllowList));

        let absent = SiteConfig {
            create_waf_acl: true,
            allow_cidrs: None,
            ..base()
        };
        assert_eq!(validate(&absent), Err(ConfigurationError::EmptyAllowList));
    }

    #[test]
    fn test_access_policy_region() {
        let config = SiteConfig {
            create_waf_acl: true,
            allow_cidrs: Some(vec!["1.2.3.0/24".to_string()]),
            region: "eu-west-1".to_string(),
            ..base()
        };
        assert_eq!(
            validate(&config),
            Err(ConfigurationError::AccessPolicyRegionMismatch {
                region: "eu-west-1".to_string(),
                required: CDN_REGION,
            })
        );
    }

    #[test]
    fn test_certificate_rule_precedes_access_policy_rules() {
        let config = SiteConfig {
            use_custom_domain: true,
            create_waf_acl: true,
            allow_cidrs: Some(vec![]),
            region: "eu-west-1".to_string(),
            ..base()
        };
        assert_eq!(
            validate(&config),
            Err(ConfigurationError::UseCustomDomainRequiresCertificate)
        );
    }

    #[test]
    fn test_empty_domain_parts_are_not_checked() {
        let config = SiteConfig {
            use_custom_domain: true,
            create_cert: true,
            hostname: String::new(),
            root_domain: String::new(),
            ..base()
        };
        assert_eq!(validate(&config), Ok(&config));
        assert_eq!(config.site_domain().wildcard(), "*.");
        assert_eq!(config.site_domain().fqdn(), ".");
    }
}
