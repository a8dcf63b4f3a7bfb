// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-site-stack
//!
//! Deterministic configurations and collaborators shared by the integration
//! suites. Each scenario configuration is built here and nowhere else.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cim_site_stack::{AssetSync, AssetSyncError, SiteConfig, StaticZoneLookup, CDN_REGION};

pub const SVC_NAME: &str = "web-demo";
pub const ROOT_DOMAIN: &str = "example.com";
pub const HOSTNAME: &str = "www";
pub const ZONE_ID: &str = "Z0123456789ABCDEFGHIJ";
pub const CERT_ARN: &str =
    "arn:aws:acm:us-east-1:111111111111:certificate/01934f4a-0001-7000-8000-000000000001";
pub const ALLOWED_CIDR: &str = "1.2.3.0/24";

/// Common fields with every feature flag off
pub fn base_config() -> SiteConfig {
    SiteConfig {
        svc_name: SVC_NAME.to_string(),
        root_domain: ROOT_DOMAIN.to_string(),
        hostname: HOSTNAME.to_string(),
        region: CDN_REGION.to_string(),
        ..Default::default()
    }
}

/// Scenario A: CDN hostname only
pub fn scenario_a() -> SiteConfig {
    base_config()
}

/// Scenario B: custom domain with no certificate source
pub fn scenario_b() -> SiteConfig {
    SiteConfig {
        use_custom_domain: true,
        create_cert: false,
        cert_arn: Some(String::new()),
        ..base_config()
    }
}

/// Scenario C: access policy with an empty allowlist
pub fn scenario_c() -> SiteConfig {
    SiteConfig {
        create_waf_acl: true,
        allow_cidrs: Some(vec![]),
        ..base_config()
    }
}

/// Scenario D: access policy outside the CDN region
pub fn scenario_d() -> SiteConfig {
    SiteConfig {
        create_waf_acl: true,
        allow_cidrs: Some(vec![ALLOWED_CIDR.to_string()]),
        region: "eu-west-1".to_string(),
        ..base_config()
    }
}

/// Scenario E: every feature enabled
pub fn scenario_e() -> SiteConfig {
    SiteConfig {
        use_custom_domain: true,
        create_cert: true,
        create_dns: true,
        create_waf_acl: true,
        allow_cidrs: Some(vec![ALLOWED_CIDR.to_string()]),
        ..base_config()
    }
}

/// Custom domain served with an existing certificate
pub fn referenced_certificate() -> SiteConfig {
    SiteConfig {
        use_custom_domain: true,
        cert_arn: Some(CERT_ARN.to_string()),
        ..base_config()
    }
}

/// Zone lookup that knows the fixture root domain
pub fn zones() -> StaticZoneLookup {
    StaticZoneLookup::new().with_zone(ROOT_DOMAIN, ZONE_ID)
}

/// Calls received by [`RecordingAssetSync`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetCall {
    Sync { assets: PathBuf, bucket: String },
    Invalidate { distribution: String, paths: Vec<String> },
}

/// Asset sync double that records calls
#[derive(Debug, Default)]
pub struct RecordingAssetSync {
    calls: Mutex<Vec<AssetCall>>,
    fail_sync: bool,
}

impl RecordingAssetSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sync: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<AssetCall> {
        self.calls.lock().expect("asset call log poisoned").clone()
    }
}

#[async_trait]
impl AssetSync for RecordingAssetSync {
    async fn sync(&self, local_assets: &Path, target_bucket: &str) -> Result<(), AssetSyncError> {
        if self.fail_sync {
            return Err(AssetSyncError::Sync {
                bucket: target_bucket.to_string(),
                reason: "upload refused".to_string(),
            });
        }
        self.calls
            .lock()
            .expect("asset call log poisoned")
            .push(AssetCall::Sync {
                assets: local_assets.to_path_buf(),
                bucket: target_bucket.to_string(),
            });
        Ok(())
    }

    async fn invalidate(&self, distribution_id: &str, paths: &[String]) -> Result<(), AssetSyncError> {
        self.calls
            .lock()
            .expect("asset call log poisoned")
            .push(AssetCall::Invalidate {
                distribution: distribution_id.to_string(),
                paths: paths.to_vec(),
            });
        Ok(())
    }
}
