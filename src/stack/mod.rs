// Copyright (c) 2025 - Cowboy AI, Inc.
//! Site Stack Composition
//!
//! Turns one [`SiteConfig`] into a validated resource graph and its outputs
//! in a single sequential pass. Each stage consumes the identifiers produced
//! by the stages before it:
//!
//! ```text
//! validate ─▶ certificate ─▶ origin ─▶ access policy ─▶ distribution ─▶ dns alias
//!                 │                        │                 ▲   │           ▲
//!                 └────────────────────────┴─────────────────┘   └───────────┘
//! ```
//!
//! The build is fail-fast. The graph and outputs are local to the call and
//! only returned once every stage has succeeded, so a failure never leaves a
//! partial graph for the provisioning backend.

pub mod access_policy;
pub mod certificate;
pub mod distribution;
pub mod dns;
pub mod origin;
pub mod validation;

pub use access_policy::AccessPolicy;
pub use certificate::CertificateStrategy;
pub use distribution::{Distribution, Overlay, OverlayContext, OVERLAYS};
pub use dns::{DnsAlias, StaticZoneLookup, Zone, ZoneLookup};
pub use origin::Origin;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::errors::StackResult;
use crate::graph::{ResourceGraph, ResourceId};
use crate::outputs::OutputSet;

/// Template description for every synthesized site stack
pub const STACK_DESCRIPTION: &str = "Static site behind a CDN distribution";

/// Tag key carrying `svcName` on every owned resource
pub const SERVICE_TAG: &str = "Service";

/// Result of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteStack {
    pub description: String,
    pub graph: ResourceGraph,
    pub outputs: OutputSet,
    pub certificate: CertificateStrategy,
    pub bucket: ResourceId,
    pub distribution: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_policy: Option<ResourceId>,
}

impl SiteStack {
    /// Compose the full topology for `config`
    pub fn build<Z>(config: &SiteConfig, zones: &Z) -> StackResult<Self>
    where
        Z: ZoneLookup + ?Sized,
    {
        let config = validation::validate(config)?;
        debug!("Configuration for {:?} passed validation", config.svc_name);

        let certificate = CertificateStrategy::resolve(config)?;
        info!("Certificate strategy: {}", certificate);

        let mut graph = ResourceGraph::new();
        if !config.svc_name.is_empty() {
            graph = graph.with_common_tag(SERVICE_TAG, config.svc_name.as_str());
        }
        let mut outputs = OutputSet::new();
        let prefix = export_prefix(&config.svc_name);

        let certificate_id = certificate.emit(&mut graph)?;
        let origin = origin::build(&mut graph)?;

        let access_policy = access_policy::build(config, &mut graph, &mut outputs, &prefix)?;
        if let Some(policy) = &access_policy {
            info!(
                "Access policy chain built: {} -> {} -> {}",
                policy.ip_set, policy.rule_group, policy.web_acl
            );
        }

        let distribution = distribution::build(
            config,
            &mut graph,
            &origin,
            certificate_id.as_ref(),
            access_policy.as_ref(),
            &mut outputs,
            &prefix,
        )?;
        info!(
            "Distribution {} composed with overlays {:?}",
            distribution.id, distribution.applied
        );

        if let Some(alias) = dns::bind(config, zones, &mut graph, &distribution.id, &mut outputs, &prefix)? {
            info!("DNS alias {} bound in zone {}", alias.record, alias.zone);
        }

        info!(
            "Site stack built: {} resources, outputs {:?}",
            graph.len(),
            outputs.names()
        );

        Ok(Self {
            description: STACK_DESCRIPTION.to_string(),
            graph,
            outputs,
            certificate,
            bucket: origin.bucket,
            distribution: distribution.id,
            access_policy: access_policy.map(|policy| policy.web_acl),
        })
    }
}

/// camelCase prefix for export names, e.g. `web-demo` → `webDemo`
pub fn export_prefix(svc_name: &str) -> String {
    let mut prefix = String::new();
    for (i, word) in svc_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                prefix.push(first.to_ascii_lowercase());
            } else {
                prefix.push(first.to_ascii_uppercase());
            }
            prefix.push_str(chars.as_str());
        }
    }
    if prefix.is_empty() {
        prefix.push_str("site");
    }
    prefix
}
