// Copyright (c) 2025 - Cowboy AI, Inc.
//! Access Policy Chain
//!
//! Builds the allow-then-block IP filter as three nodes, each holding the
//! generated identifier of its predecessor:
//!
//! ```text
//! IpSet (allowCidrs) ──Arn──▶ RuleGroup (allow, priority 0) ──Arn──▶ WebAcl (default block, priority 1)
//! ```
//!
//! Only runs when `createWafAcl` is set. Validation has already guaranteed a
//! non-empty allowlist and the CDN region, so the only failures left are
//! graph invariant violations.

use serde_json::{json, Value};
use tracing::debug;

use crate::config::SiteConfig;
use crate::errors::GraphError;
use crate::graph::{ResourceGraph, ResourceId, ResourceKind, ResourceNode};
use crate::outputs::{Output, OutputSet, OutputValue, ACCESS_POLICY_ID};

pub const IP_SET_ID: &str = "ipSet";
pub const RULE_GROUP_ID: &str = "wafRules";
pub const WEB_ACL_ID: &str = "webAcl";

/// Scope required for policies attached to a CDN distribution
pub const SCOPE: &str = "CLOUDFRONT";

/// Declared capacity of the rule group (one IP set match)
pub const RULE_GROUP_CAPACITY: u32 = 1;

const IP_SET_NAME: &str = "siteAllowCidrs";
const RULE_GROUP_NAME: &str = "siteRuleGroup";
const ALLOW_RULE_NAME: &str = "allowListedIps";
const ACL_RULE_NAME: &str = "siteRules";

/// Identifiers of the three nodes in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    pub ip_set: ResourceId,
    pub rule_group: ResourceId,
    pub web_acl: ResourceId,
}

/// Build the chain when the configuration asks for it
///
/// Emits the `accessPolicyId` output on success.
pub fn build(
    config: &SiteConfig,
    graph: &mut ResourceGraph,
    outputs: &mut OutputSet,
    export_prefix: &str,
) -> Result<Option<AccessPolicy>, GraphError> {
    if !config.create_waf_acl {
        return Ok(None);
    }

    let ip_set = graph.add(ip_set_node(config.allow_cidrs()))?;
    debug!("Added address set {} with {} entries", ip_set, config.allow_cidrs().len());

    let node = rule_group_node(graph, &ip_set)?;
    let rule_group = graph.add(node)?;
    debug!("Added rule group {} referencing {}", rule_group, ip_set);

    let node = web_acl_node(graph, &rule_group)?;
    let web_acl = graph.add(node)?;
    debug!("Added access-control list {} referencing {}", web_acl, rule_group);

    outputs.emit(
        Output::new(
            ACCESS_POLICY_ID,
            "Site access-control list id",
            OutputValue::attribute(&web_acl, "Id"),
        )
        .with_export(format!("{}AclId", export_prefix)),
    );

    Ok(Some(AccessPolicy {
        ip_set,
        rule_group,
        web_acl,
    }))
}

fn visibility(metric_name: &str) -> Value {
    json!({
        "CloudWatchMetricsEnabled": false,
        "MetricName": metric_name,
        "SampledRequestsEnabled": false,
    })
}

/// Addresses are passed through verbatim: order kept, duplicates kept
fn ip_set_node(cidrs: &[String]) -> ResourceNode {
    ResourceNode::new(IP_SET_ID, ResourceKind::IpSet)
        .with_property("Name", json!(IP_SET_NAME))
        .with_property("Description", json!("Site allowed addresses"))
        .with_property("IPAddressVersion", json!("IPV4"))
        .with_property("Addresses", json!(cidrs))
        .with_property("Scope", json!(SCOPE))
}

fn rule_group_node(graph: &ResourceGraph, ip_set: &ResourceId) -> Result<ResourceNode, GraphError> {
    let ip_set_arn = graph.attribute(ip_set, "Arn")?;
    Ok(ResourceNode::new(RULE_GROUP_ID, ResourceKind::RuleGroup)
        .with_property("Name", json!(RULE_GROUP_NAME))
        .with_property("Capacity", json!(RULE_GROUP_CAPACITY))
        .with_property("Scope", json!(SCOPE))
        .with_property("VisibilityConfig", visibility("rulesSite"))
        .with_property(
            "Rules",
            json!([{
                "Name": ALLOW_RULE_NAME,
                "Action": { "Allow": {} },
                "Priority": 0,
                "Statement": {
                    "IPSetReferenceStatement": { "Arn": ip_set_arn }
                },
                "VisibilityConfig": visibility("ruleSite"),
            }]),
        )
        .depends_on(ip_set))
}

fn web_acl_node(graph: &ResourceGraph, rule_group: &ResourceId) -> Result<ResourceNode, GraphError> {
    let rule_group_arn = graph.attribute(rule_group, "Arn")?;
    Ok(ResourceNode::new(WEB_ACL_ID, ResourceKind::WebAcl)
        .with_property("Description", json!("Site ACL"))
        .with_property("DefaultAction", json!({ "Block": {} }))
        .with_property("Scope", json!(SCOPE))
        .with_property("VisibilityConfig", visibility("aclSite"))
        .with_property(
            "Rules",
            json!([{
                "Name": ACL_RULE_NAME,
                "Priority": 1,
                "Statement": {
                    "RuleGroupReferenceStatement": { "Arn": rule_group_arn }
                },
                "OverrideAction": { "None": {} },
                "VisibilityConfig": visibility("ruleSiteAcl"),
            }]),
        )
        .depends_on(rule_group))
}
