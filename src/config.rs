// Copyright (c) 2025 - Cowboy AI, Inc.
//! Site stack configuration
//!
//! [`SiteConfig`] mirrors the `options.json` document that drives a build.
//! It is read once, validated, and then passed by shared reference through
//! every stage; nothing mutates it after loading.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::errors::{StackError, StackResult};

/// Region where CDN certificates and access policies must be created
pub const CDN_REGION: &str = "us-east-1";

/// Environment variable consulted when `region` is not configured
pub const REGION_ENV: &str = "CDK_DEFAULT_REGION";

/// Environment variable consulted when `account` is not configured
pub const ACCOUNT_ENV: &str = "CDK_DEFAULT_ACCOUNT";

/// Declarative input for one site stack build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    /// Service tag applied to all emitted resources
    pub svc_name: String,

    /// Serve the site on `<hostname>.<rootDomain>` instead of the CDN hostname
    pub use_custom_domain: bool,

    pub root_domain: String,

    pub hostname: String,

    /// Create a wildcard certificate rather than referencing `cert_arn`
    pub create_cert: bool,

    /// Existing certificate identifier, used when `create_cert` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_arn: Option<String>,

    /// Restrict access to `allow_cidrs` through a WAF ACL
    pub create_waf_acl: bool,

    /// IPv4 allowlist; `None` when absent or not an array of strings
    #[serde(
        deserialize_with = "deserialize_cidr_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_cidrs: Option<Vec<String>>,

    /// Publish an alias record in the hosted zone for `root_domain`
    pub create_dns: bool,

    pub region: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Accept only a JSON array of strings; anything else reads as absent
fn deserialize_cidr_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(cidr) => Some(cidr),
                _ => None,
            })
            .collect(),
        _ => None,
    })
}

impl SiteConfig {
    /// Parse a configuration document
    pub fn from_json_str(json: &str) -> StackResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> StackResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StackError::ConfigLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    /// Fill `region` and `account` from the environment when unset
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`.
    pub fn apply_env_defaults<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.region.is_empty() {
            if let Some(region) = lookup(REGION_ENV) {
                self.region = region;
            }
        }
        if self.account.is_none() {
            self.account = lookup(ACCOUNT_ENV);
        }
        self
    }

    /// Fail when no deployment region could be determined
    pub fn require_region(self) -> StackResult<Self> {
        if self.region.is_empty() {
            return Err(StackError::ConfigLoad(format!(
                "region is not set in the configuration and {} is not defined",
                REGION_ENV
            )));
        }
        Ok(self)
    }

    /// Configured certificate identifier, treating an empty string as absent
    pub fn cert_arn(&self) -> Option<&str> {
        self.cert_arn.as_deref().filter(|arn| !arn.is_empty())
    }

    /// Allowlist entries, empty when absent
    pub fn allow_cidrs(&self) -> &[String] {
        self.allow_cidrs.as_deref().unwrap_or_default()
    }

    /// Domain names derived from `hostname` and `root_domain`
    pub fn site_domain(&self) -> SiteDomain<'_> {
        SiteDomain {
            hostname: &self.hostname,
            root_domain: &self.root_domain,
        }
    }
}

/// Custom domain composition for the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteDomain<'a> {
    hostname: &'a str,
    root_domain: &'a str,
}

impl SiteDomain<'_> {
    /// The root domain the hosted zone is looked up by
    pub fn root(&self) -> &str {
        self.root_domain
    }

    /// `<hostname>.<rootDomain>`
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.hostname, self.root_domain)
    }

    /// `*.<rootDomain>`, the certificate domain pattern
    pub fn wildcard(&self) -> String {
        format!("*.{}", self.root_domain)
    }

    /// `https://<hostname>.<rootDomain>`
    pub fn url(&self) -> String {
        format!("https://{}", self.fqdn())
    }
}

impl fmt::Display for SiteDomain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hostname, self.root_domain)
    }
}
