// Copyright (c) 2025 - Cowboy AI, Inc.
//! Distribution Composition
//!
//! The distribution definition is the result of folding an ordered list of
//! named overlays over an empty record:
//!
//! ```text
//! base ──▶ certificate (custom domain) ──▶ access policy (WAF ACL)
//! ```
//!
//! Each overlay declares the keys it may set. Declarations must be pairwise
//! disjoint, an overlay may only set keys it declares, and no overlay may
//! overwrite a key an earlier overlay already set. Optional overlays return
//! `None` when their stage produced nothing.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::config::SiteConfig;
use crate::errors::{GraphError, OverlayError, StackResult};
use crate::graph::{ResourceGraph, ResourceId, ResourceKind, ResourceNode};
use crate::outputs::{Output, OutputSet, OutputValue, DEFAULT_URL};
use crate::stack::access_policy::AccessPolicy;
use crate::stack::origin::Origin;

pub const DISTRIBUTION_ID: &str = "webDistribution";

/// Minimum viewer TLS policy when serving the custom domain
pub const MIN_TLS_POLICY: &str = "TLSv1.2_2019";

const ORIGIN_ID: &str = "origin1";

/// Partial property set produced by an overlay
pub type Properties = BTreeMap<String, Value>;

/// Everything an overlay may read
#[derive(Debug, Clone, Copy)]
pub struct OverlayContext<'a> {
    pub config: &'a SiteConfig,
    pub graph: &'a ResourceGraph,
    pub origin: &'a Origin,
    /// Present exactly when a custom domain is used
    pub certificate: Option<&'a ResourceId>,
    pub access_policy: Option<&'a AccessPolicy>,
}

/// A named, conditionally applied partial property set
#[derive(Clone, Copy)]
pub struct Overlay {
    pub name: &'static str,
    pub keys: &'static [&'static str],
    build: fn(&OverlayContext<'_>) -> Result<Option<Properties>, GraphError>,
}

impl Overlay {
    pub const fn new(
        name: &'static str,
        keys: &'static [&'static str],
        build: fn(&OverlayContext<'_>) -> Result<Option<Properties>, GraphError>,
    ) -> Self {
        Self { name, keys, build }
    }

    /// Properties to merge, or `None` when the overlay does not apply
    pub fn build(&self, ctx: &OverlayContext<'_>) -> Result<Option<Properties>, GraphError> {
        (self.build)(ctx)
    }

    /// Merge `partial` into `target` under this overlay's declaration
    pub fn merge_into(&self, target: &mut Properties, partial: Properties) -> Result<(), OverlayError> {
        for (key, value) in partial {
            if !self.keys.iter().any(|declared| *declared == key) {
                return Err(OverlayError::UndeclaredKey {
                    overlay: self.name,
                    key,
                });
            }
            if target.contains_key(&key) {
                return Err(OverlayError::KeyConflict {
                    overlay: self.name,
                    key,
                });
            }
            target.insert(key, value);
        }
        Ok(())
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("name", &self.name)
            .field("keys", &self.keys)
            .finish()
    }
}

/// Origin and default routing, always applied
pub const BASE_OVERLAY: Overlay = Overlay::new(
    "base",
    &[
        "Origins",
        "DefaultCacheBehavior",
        "DefaultRootObject",
        "Enabled",
        "HttpVersion",
        "IPV6Enabled",
        "PriceClass",
    ],
    base_overlay,
);

/// Viewer certificate and alias hostname
pub const CERTIFICATE_OVERLAY: Overlay =
    Overlay::new("certificate", &["ViewerCertificate", "Aliases"], certificate_overlay);

/// Access-control list attachment
pub const ACCESS_POLICY_OVERLAY: Overlay =
    Overlay::new("access_policy", &["WebACLId"], access_policy_overlay);

/// Overlays in application order
pub const OVERLAYS: [Overlay; 3] = [BASE_OVERLAY, CERTIFICATE_OVERLAY, ACCESS_POLICY_OVERLAY];

/// Check that no two overlays declare the same key
pub fn check_disjoint(overlays: &[Overlay]) -> Result<(), OverlayError> {
    for (i, first) in overlays.iter().enumerate() {
        for second in &overlays[i + 1..] {
            if let Some(key) = first.keys.iter().copied().find(|key| second.keys.contains(key)) {
                return Err(OverlayError::OverlappingDeclarations {
                    first: first.name,
                    second: second.name,
                    key,
                });
            }
        }
    }
    Ok(())
}

/// Merged distribution definition and the overlays that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub properties: Properties,
    pub applied: Vec<&'static str>,
}

/// Fold `overlays` in order
pub fn compose(overlays: &[Overlay], ctx: &OverlayContext<'_>) -> StackResult<Composition> {
    check_disjoint(overlays)?;

    let mut properties = Properties::new();
    let mut applied = Vec::new();
    for overlay in overlays {
        if let Some(partial) = overlay.build(ctx)? {
            overlay.merge_into(&mut properties, partial)?;
            applied.push(overlay.name);
        }
    }
    Ok(Composition {
        properties,
        applied,
    })
}

/// Identifier of the composed distribution and the overlays applied to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub id: ResourceId,
    pub applied: Vec<&'static str>,
}

impl Distribution {
    pub fn has_overlay(&self, name: &str) -> bool {
        self.applied.iter().any(|applied| *applied == name)
    }
}

/// Compose the distribution, add it to the graph and emit `defaultUrl`
pub fn build(
    config: &SiteConfig,
    graph: &mut ResourceGraph,
    origin: &Origin,
    certificate: Option<&ResourceId>,
    access_policy: Option<&AccessPolicy>,
    outputs: &mut OutputSet,
    export_prefix: &str,
) -> StackResult<Distribution> {
    let ctx = OverlayContext {
        config,
        graph,
        origin,
        certificate,
        access_policy,
    };
    let composition = compose(&OVERLAYS, &ctx)?;
    debug!("Applied distribution overlays: {:?}", composition.applied);

    let mut node = ResourceNode::new(DISTRIBUTION_ID, ResourceKind::Distribution)
        .with_property(
            "DistributionConfig",
            Value::Object(composition.properties.into_iter().collect()),
        )
        .depends_on(&origin.bucket)
        .depends_on(&origin.identity);
    if let Some(certificate) = certificate {
        node = node.depends_on(certificate);
    }
    if let Some(policy) = access_policy {
        node = node.depends_on(&policy.web_acl);
    }
    let id = graph.add(node)?;

    outputs.emit(
        Output::new(
            DEFAULT_URL,
            "Site CDN URL",
            OutputValue::prefixed("https://", &id, "DomainName"),
        )
        .with_export(format!("{}WebUrl", export_prefix)),
    );

    Ok(Distribution {
        id,
        applied: composition.applied,
    })
}

fn base_overlay(ctx: &OverlayContext<'_>) -> Result<Option<Properties>, GraphError> {
    let graph = ctx.graph;
    let domain_name = graph.attribute(&ctx.origin.bucket, "RegionalDomainName")?;
    let identity = graph.reference(&ctx.origin.identity)?;

    let mut properties = Properties::new();
    properties.insert(
        "Origins".to_string(),
        json!([{
            "Id": ORIGIN_ID,
            "DomainName": domain_name,
            "S3OriginConfig": {
                "OriginAccessIdentity": {
                    "Fn::Join": ["", ["origin-access-identity/cloudfront/", identity]]
                }
            }
        }]),
    );
    properties.insert(
        "DefaultCacheBehavior".to_string(),
        json!({
            "TargetOriginId": ORIGIN_ID,
            "ViewerProtocolPolicy": "redirect-to-https",
            "AllowedMethods": ["GET", "HEAD"],
            "CachedMethods": ["GET", "HEAD"],
            "Compress": true,
            "ForwardedValues": {
                "QueryString": false,
                "Cookies": { "Forward": "none" }
            }
        }),
    );
    properties.insert("DefaultRootObject".to_string(), json!("index.html"));
    properties.insert("Enabled".to_string(), json!(true));
    properties.insert("HttpVersion".to_string(), json!("http2"));
    properties.insert("IPV6Enabled".to_string(), json!(true));
    properties.insert("PriceClass".to_string(), json!("PriceClass_100"));
    Ok(Some(properties))
}

fn certificate_overlay(ctx: &OverlayContext<'_>) -> Result<Option<Properties>, GraphError> {
    let Some(certificate) = ctx.certificate else {
        return Ok(None);
    };

    let mut properties = Properties::new();
    properties.insert(
        "ViewerCertificate".to_string(),
        json!({
            "AcmCertificateArn": ctx.graph.reference(certificate)?,
            "SslSupportMethod": "sni-only",
            "MinimumProtocolVersion": MIN_TLS_POLICY,
        }),
    );
    properties.insert(
        "Aliases".to_string(),
        json!([ctx.config.site_domain().fqdn()]),
    );
    Ok(Some(properties))
}

fn access_policy_overlay(ctx: &OverlayContext<'_>) -> Result<Option<Properties>, GraphError> {
    let Some(policy) = ctx.access_policy else {
        return Ok(None);
    };

    let mut properties = Properties::new();
    properties.insert(
        "WebACLId".to_string(),
        ctx.graph.attribute(&policy.web_acl, "Arn")?,
    );
    Ok(Some(properties))
}
