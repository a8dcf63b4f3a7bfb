// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Graph
//!
//! The output of a build: an append-only sequence of [`ResourceNode`]s where
//! every node may only depend on nodes added before it. Downstream nodes
//! hold the [`ResourceId`] of what they reference, never the node itself,
//! so the graph cannot contain ownership cycles.
//!
//! # Invariants
//!
//! - Resource ids are unique within a graph
//! - A node's dependencies are already present when it is added
//! - Nodes are never removed or modified once added
//! - Insertion order is preserved and is the order handed to the backend

pub mod resource_kind;

pub use resource_kind::ResourceKind;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::errors::GraphError;

/// Logical identifier of a resource within one stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One resource in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    id: ResourceId,
    kind: ResourceKind,
    properties: BTreeMap<String, Value>,
    depends_on: BTreeSet<ResourceId>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    tags: BTreeMap<String, String>,
    /// Physical id of an existing resource this node only refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    imported: Option<String>,
    /// Keep the physical resource when the stack is deleted
    #[serde(default)]
    retain: bool,
}

impl ResourceNode {
    /// A resource this stack creates
    pub fn new(id: impl Into<ResourceId>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            properties: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            tags: BTreeMap::new(),
            imported: None,
            retain: false,
        }
    }

    /// An existing resource referenced by its physical id
    ///
    /// No physical resource is implied; references to it resolve to the
    /// physical id itself.
    pub fn imported(
        id: impl Into<ResourceId>,
        kind: ResourceKind,
        physical_id: impl Into<String>,
    ) -> Self {
        Self {
            imported: Some(physical_id.into()),
            ..Self::new(id, kind)
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn depends_on(mut self, id: &ResourceId) -> Self {
        self.depends_on.insert(id.clone());
        self
    }

    pub fn retained(mut self) -> Self {
        self.retain = true;
        self
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn dependencies(&self) -> &BTreeSet<ResourceId> {
        &self.depends_on
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn physical_id(&self) -> Option<&str> {
        self.imported.as_deref()
    }

    pub fn is_imported(&self) -> bool {
        self.imported.is_some()
    }

    pub fn is_retained(&self) -> bool {
        self.retain
    }
}

/// Append-only graph of resources for one stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    /// Tags stamped onto every owned node as it is added
    common_tags: BTreeMap<String, String>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every owned node added from now on
    pub fn with_common_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.common_tags.insert(key.into(), value.into());
        self
    }

    /// Append a node, returning its id
    ///
    /// # Invariants
    /// - The id is not already present
    /// - Every dependency is already present
    pub fn add(&mut self, mut node: ResourceNode) -> Result<ResourceId, GraphError> {
        if self.contains(&node.id) {
            return Err(GraphError::DuplicateResource(node.id));
        }
        if let Some(missing) = node.depends_on.iter().find(|dep| !self.contains(dep)) {
            return Err(GraphError::DanglingReference {
                node: node.id.clone(),
                missing: missing.clone(),
            });
        }

        if !node.is_imported() {
            for (key, value) in &self.common_tags {
                node.tags.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        let id = node.id.clone();
        self.nodes.push(node);
        Ok(id)
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.nodes.iter().any(|node| &node.id == id)
    }

    pub fn get(&self, id: &ResourceId) -> Option<&ResourceNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Primary reference value for a node
    ///
    /// Owned nodes resolve to `{"Ref": id}`; imported nodes to their
    /// physical id.
    pub fn reference(&self, id: &ResourceId) -> Result<Value, GraphError> {
        let node = self.require(id)?;
        Ok(match &node.imported {
            Some(physical_id) => Value::String(physical_id.clone()),
            None => json!({ "Ref": id.as_str() }),
        })
    }

    /// Generated attribute reference, e.g. an `Arn` or `DomainName`
    pub fn attribute(&self, id: &ResourceId, attribute: &str) -> Result<Value, GraphError> {
        self.require(id)?;
        Ok(json!({ "Fn::GetAtt": [id.as_str(), attribute] }))
    }

    fn require(&self, id: &ResourceId) -> Result<&ResourceNode, GraphError> {
        self.get(id)
            .ok_or_else(|| GraphError::UnknownResource(id.clone()))
    }
}
