// Copyright (c) 2025 - Cowboy AI, Inc.
//! DNS Alias Binding
//!
//! When both `useCustomDomain` and `createDns` hold, the hosted zone for the
//! root domain is resolved through a [`ZoneLookup`] and an alias record for
//! `<hostname>.<rootDomain>` is pointed at the distribution. Either flag alone
//! leaves the graph untouched.
//!
//! A failed lookup aborts the build; no record is added for a zone that could
//! not be resolved.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::config::SiteConfig;
use crate::errors::{StackError, StackResult, ZoneLookupError};
use crate::graph::{ResourceGraph, ResourceId, ResourceKind, ResourceNode};
use crate::outputs::{Output, OutputSet, OutputValue, CUSTOM_URL};

pub const ZONE_ID: &str = "zone";
pub const ALIAS_RECORD_ID: &str = "cfAlias";

/// Fixed hosted zone id every CDN distribution alias targets
pub const CDN_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// A resolved hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub zone_id: String,
    pub zone_name: String,
}

/// Hosted zone resolution
pub trait ZoneLookup {
    fn find_zone(&self, domain: &str) -> Result<Zone, ZoneLookupError>;
}

/// Zone lookup backed by a fixed domain → zone id map
///
/// Loaded from a context document such as:
///
/// ```json
/// { "hostedZones": { "example.com": "Z0123456789ABCDEFGHIJ" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticZoneLookup {
    #[serde(default)]
    hosted_zones: BTreeMap<String, String>,
}

impl StaticZoneLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, domain: impl Into<String>, zone_id: impl Into<String>) -> Self {
        self.hosted_zones.insert(domain.into(), zone_id.into());
        self
    }

    pub fn from_json_str(json: &str) -> StackResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> StackResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StackError::ConfigLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }
}

impl ZoneLookup for StaticZoneLookup {
    fn find_zone(&self, domain: &str) -> Result<Zone, ZoneLookupError> {
        let domain = domain.trim_end_matches('.');
        self.hosted_zones
            .get(domain)
            .map(|zone_id| Zone {
                zone_id: zone_id.clone(),
                zone_name: domain.to_string(),
            })
            .ok_or_else(|| ZoneLookupError::NotFound {
                domain: domain.to_string(),
            })
    }
}

/// Identifiers added by a successful binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAlias {
    pub zone: ResourceId,
    pub record: ResourceId,
}

/// Bind the alias record when both flags hold
///
/// Emits the `customUrl` output on success.
pub fn bind<Z>(
    config: &SiteConfig,
    zones: &Z,
    graph: &mut ResourceGraph,
    distribution: &ResourceId,
    outputs: &mut OutputSet,
    export_prefix: &str,
) -> StackResult<Option<DnsAlias>>
where
    Z: ZoneLookup + ?Sized,
{
    if !(config.use_custom_domain && config.create_dns) {
        return Ok(None);
    }

    let site = config.site_domain();
    let resolved = zones.find_zone(site.root())?;
    debug!("Resolved hosted zone {} for {}", resolved.zone_id, site.root());

    let zone = graph.add(
        ResourceNode::imported(ZONE_ID, ResourceKind::HostedZone, resolved.zone_id.as_str())
            .with_property("Name", json!(resolved.zone_name)),
    )?;

    let record = ResourceNode::new(ALIAS_RECORD_ID, ResourceKind::AliasRecord)
        .with_property("HostedZoneId", graph.reference(&zone)?)
        .with_property("Name", json!(format!("{}.", site.fqdn())))
        .with_property("Type", json!("A"))
        .with_property(
            "AliasTarget",
            json!({
                "DNSName": graph.attribute(distribution, "DomainName")?,
                "HostedZoneId": CDN_HOSTED_ZONE_ID,
            }),
        )
        .depends_on(&zone)
        .depends_on(distribution);
    let record = graph.add(record)?;

    outputs.emit(
        Output::new(
            CUSTOM_URL,
            "Site custom URL",
            OutputValue::Literal(site.url()),
        )
        .with_export(format!("{}CustomWebUrl", export_prefix)),
    );

    Ok(Some(DnsAlias { zone, record }))
}
