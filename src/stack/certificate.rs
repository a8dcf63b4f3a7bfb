// Copyright (c) 2025 - Cowboy AI, Inc.
//! Certificate Resolution
//!
//! Selects exactly one of three terminal strategies from the configuration
//! flags. There are no transitions between strategies within a build.
//!
//! ```text
//! useCustomDomain = false                    → Skip
//! useCustomDomain = true,  createCert = true  → Create  (*.<rootDomain>, DNS validation)
//! useCustomDomain = true,  createCert = false → Reference (certArn)
//! ```
//!
//! A created certificate is validated asynchronously through DNS. Publishing
//! the validation record is left to the operator; the build never waits on it.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::config::SiteConfig;
use crate::errors::{ConfigurationError, GraphError};
use crate::graph::{ResourceGraph, ResourceId, ResourceKind, ResourceNode};

/// Logical id of a certificate this stack creates
pub const CREATED_CERTIFICATE_ID: &str = "cfCert";

/// Logical id of an existing certificate referenced by ARN
pub const REFERENCED_CERTIFICATE_ID: &str = "rootCfCertificate";

/// How the viewer certificate is obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CertificateStrategy {
    /// No custom domain; the CDN's generated hostname and certificate are used
    Skip,

    /// Request a new wildcard certificate
    Create { domain_pattern: String },

    /// Wrap an externally issued certificate
    Reference { arn: String },
}

impl CertificateStrategy {
    /// Select the strategy for a configuration
    pub fn resolve(config: &SiteConfig) -> Result<Self, ConfigurationError> {
        if !config.use_custom_domain {
            return Ok(Self::Skip);
        }
        if config.create_cert {
            return Ok(Self::Create {
                domain_pattern: config.site_domain().wildcard(),
            });
        }
        config
            .cert_arn()
            .map(|arn| Self::Reference {
                arn: arn.to_string(),
            })
            .ok_or(ConfigurationError::UseCustomDomainRequiresCertificate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Create { .. } => "create",
            Self::Reference { .. } => "reference",
        }
    }

    /// Add the certificate node this strategy implies, if any
    pub fn emit(&self, graph: &mut ResourceGraph) -> Result<Option<ResourceId>, GraphError> {
        let node = match self {
            Self::Skip => return Ok(None),
            Self::Create { domain_pattern } => {
                ResourceNode::new(CREATED_CERTIFICATE_ID, ResourceKind::Certificate)
                    .with_property("DomainName", json!(domain_pattern))
                    .with_property("ValidationMethod", json!("DNS"))
            }
            Self::Reference { arn } => ResourceNode::imported(
                REFERENCED_CERTIFICATE_ID,
                ResourceKind::Certificate,
                arn.as_str(),
            ),
        };
        graph.add(node).map(Some)
    }
}

impl fmt::Display for CertificateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
