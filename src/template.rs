// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Synthesis
//!
//! Renders a built [`SiteStack`] as a provider template document. Imported
//! nodes are omitted (they imply no physical resource), tags are only written
//! on kinds that accept them, and retained nodes carry a `Retain` deletion
//! policy. Output is deterministic for a given stack.

use serde_json::{json, Map, Value};

use crate::graph::ResourceNode;
use crate::stack::SiteStack;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Render the full template
pub fn synthesize(stack: &SiteStack) -> Value {
    let resources: Map<String, Value> = stack
        .graph
        .nodes()
        .iter()
        .filter(|node| !node.is_imported())
        .map(|node| (node.id().to_string(), render_resource(node)))
        .collect();

    let outputs: Map<String, Value> = stack
        .outputs
        .iter()
        .map(|output| {
            let mut rendered = json!({
                "Description": output.description,
                "Value": output.value.to_template(),
            });
            if let Some(export_name) = &output.export_name {
                rendered["Export"] = json!({ "Name": export_name });
            }
            (output.name.clone(), rendered)
        })
        .collect();

    json!({
        "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
        "Description": stack.description,
        "Resources": resources,
        "Outputs": outputs,
    })
}

fn render_resource(node: &ResourceNode) -> Value {
    let mut properties: Map<String, Value> = node
        .properties()
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if node.kind().is_taggable() && !node.tags().is_empty() {
        let tags: Vec<Value> = node
            .tags()
            .iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect();
        properties.insert("Tags".to_string(), Value::Array(tags));
    }

    let mut resource = json!({
        "Type": node.kind().provider_type(),
        "Properties": properties,
    });
    if node.is_retained() {
        resource["DeletionPolicy"] = json!("Retain");
        resource["UpdateReplacePolicy"] = json!("Retain");
    }
    resource
}
