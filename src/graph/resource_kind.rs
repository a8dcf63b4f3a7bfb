// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Kind Taxonomy
//!
//! Every node in a site stack graph is one of these kinds. The kind carries
//! the provider type name used when the graph is rendered as a template and
//! whether the provider accepts tags on it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of resources a site stack can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Origin
    /// Private storage bucket holding the site assets
    Bucket,
    /// Read-identity the distribution uses to reach the bucket
    OriginAccessIdentity,
    /// Bucket policy granting the read-identity access
    BucketPolicy,

    // TLS
    /// Viewer certificate for the custom domain
    Certificate,

    // Access policy chain
    /// IPv4 address allowlist
    IpSet,
    /// Rule group wrapping the allowlist
    RuleGroup,
    /// Access-control list attached to the distribution
    WebAcl,

    // Delivery
    /// CDN distribution
    Distribution,

    // DNS
    /// Hosted zone resolved by lookup
    HostedZone,
    /// Alias record pointing at the distribution
    AliasRecord,
}

impl ResourceKind {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::OriginAccessIdentity => "origin_access_identity",
            Self::BucketPolicy => "bucket_policy",
            Self::Certificate => "certificate",
            Self::IpSet => "ip_set",
            Self::RuleGroup => "rule_group",
            Self::WebAcl => "web_acl",
            Self::Distribution => "distribution",
            Self::HostedZone => "hosted_zone",
            Self::AliasRecord => "alias_record",
        }
    }

    /// Provider resource type name used in synthesized templates
    pub fn provider_type(&self) -> &'static str {
        match self {
            Self::Bucket => "AWS::S3::Bucket",
            Self::OriginAccessIdentity => "AWS::CloudFront::CloudFrontOriginAccessIdentity",
            Self::BucketPolicy => "AWS::S3::BucketPolicy",
            Self::Certificate => "AWS::CertificateManager::Certificate",
            Self::IpSet => "AWS::WAFv2::IPSet",
            Self::RuleGroup => "AWS::WAFv2::RuleGroup",
            Self::WebAcl => "AWS::WAFv2::WebACL",
            Self::Distribution => "AWS::CloudFront::Distribution",
            Self::HostedZone => "AWS::Route53::HostedZone",
            Self::AliasRecord => "AWS::Route53::RecordSet",
        }
    }

    /// Whether the provider accepts a `Tags` property on this kind
    pub fn is_taggable(&self) -> bool {
        matches!(
            self,
            Self::Bucket
                | Self::Certificate
                | Self::IpSet
                | Self::RuleGroup
                | Self::WebAcl
                | Self::Distribution
        )
    }

    /// Whether this kind belongs to the access policy chain
    pub fn is_access_policy(&self) -> bool {
        matches!(self, Self::IpSet | Self::RuleGroup | Self::WebAcl)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
