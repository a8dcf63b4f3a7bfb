// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for stack composition and deployment

use thiserror::Error;

use crate::graph::ResourceId;

/// Cross-field configuration rule violations
///
/// Raised by validation before any resource node exists. Variants are listed
/// in the order the rules are checked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Custom domain without a certificate to serve it
    #[error("Using a custom domain requires either createCert or an existing certificate ARN")]
    UseCustomDomainRequiresCertificate,

    /// Certificate creation outside the CDN certificate region
    #[error("Stack must be deployed in {required} to create a new certificate (region is {region:?})")]
    CertificateRegionMismatch {
        region: String,
        required: &'static str,
    },

    /// Access policy requested with no addresses to allow
    #[error("Expecting a non-empty array of CIDR addresses for allowCidrs")]
    EmptyAllowList,

    /// Access policy creation outside the CDN access-policy region
    #[error("Stack must be deployed in {required} to create the WAF ACL (region is {region:?})")]
    AccessPolicyRegionMismatch {
        region: String,
        required: &'static str,
    },
}

impl ConfigurationError {
    /// Whether this is one of the region constraint specializations
    pub fn is_region_constraint(&self) -> bool {
        matches!(
            self,
            Self::CertificateRegionMismatch { .. } | Self::AccessPolicyRegionMismatch { .. }
        )
    }
}

/// DNS zone resolution failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZoneLookupError {
    #[error("No hosted zone found for domain {domain}")]
    NotFound { domain: String },

    #[error("Zone lookup failed: {0}")]
    Backend(String),
}

/// Resource graph invariant violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Resource {0} already exists in the graph")]
    DuplicateResource(ResourceId),

    #[error("Resource {node} references {missing}, which has not been added")]
    DanglingReference { node: ResourceId, missing: ResourceId },

    #[error("Resource {0} is not in the graph")]
    UnknownResource(ResourceId),
}

/// Overlay merge violations on a composed resource
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("Overlay {overlay} set key {key} it does not declare")]
    UndeclaredKey { overlay: &'static str, key: String },

    #[error("Overlay {overlay} would overwrite key {key} already set by an earlier overlay")]
    KeyConflict { overlay: &'static str, key: String },

    #[error("Overlays {first} and {second} both declare key {key}")]
    OverlappingDeclarations {
        first: &'static str,
        second: &'static str,
        key: &'static str,
    },
}

/// Provisioning backend failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    #[error("Backend rejected resource {resource}: {reason}")]
    Rejected { resource: ResourceId, reason: String },

    #[error("Provisioning backend unavailable: {0}")]
    Unavailable(String),

    /// The committed stack lacks an attribute an output is computed from
    #[error("Output {output} needs attribute {attribute} of {resource}, which was not committed")]
    UnresolvedOutput {
        output: String,
        resource: ResourceId,
        attribute: String,
    },
}

/// Asset synchronization failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetSyncError {
    #[error("Failed to sync assets to bucket {bucket}: {reason}")]
    Sync { bucket: String, reason: String },

    #[error("Failed to invalidate distribution {distribution}: {reason}")]
    Invalidation { distribution: String, reason: String },

    #[error("Committed stack has no physical id for {0}")]
    MissingPhysicalId(ResourceId),
}

/// Top-level error for building and deploying a site stack
#[derive(Debug, Error)]
pub enum StackError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Zone lookup error: {0}")]
    ZoneLookup(#[from] ZoneLookupError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Provisioning error: {0}")]
    Provisioning(#[from] ProvisioningError),

    #[error("Asset sync error: {0}")]
    AssetSync(#[from] AssetSyncError),

    /// Configuration could not be read or is incomplete
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for stack operations
pub type StackResult<T> = Result<T, StackError>;

impl From<std::io::Error> for StackError {
    fn from(err: std::io::Error) -> Self {
        StackError::ConfigLoad(err.to_string())
    }
}
