// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Pipeline
//!
//! The composition core stops at a [`SiteStack`]. Deployment hands that graph
//! to a [`ProvisioningBackend`] and, once it is committed, pushes the site
//! assets through an [`AssetSync`] service:
//!
//! ```text
//! SiteStack::build ─▶ backend.apply(graph) ─▶ assets.sync(dir, bucket) ─▶ assets.invalidate(dist, ["/"])
//! ```
//!
//! A build failure returns before the backend is called, so nothing partial
//! is ever applied. Idempotence and locking against previously applied state
//! are the backend's responsibility.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SiteConfig;
use crate::errors::{AssetSyncError, ProvisioningError, StackResult};
use crate::graph::{ResourceGraph, ResourceId, ResourceKind};
use crate::outputs::OutputSet;
use crate::stack::{SiteStack, ZoneLookup};

/// Cache paths invalidated after new assets are synced
pub const INVALIDATION_PATHS: [&str; 1] = ["/"];

/// Physical identifiers and generated attributes of an applied graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedStack {
    physical_ids: BTreeMap<ResourceId, String>,
    attributes: BTreeMap<ResourceId, BTreeMap<String, String>>,
}

impl CommittedStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_physical_id(mut self, id: &ResourceId, physical_id: impl Into<String>) -> Self {
        self.physical_ids.insert(id.clone(), physical_id.into());
        self
    }

    pub fn with_attribute(
        mut self,
        id: &ResourceId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes
            .entry(id.clone())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    pub fn physical_id(&self, id: &ResourceId) -> Option<&str> {
        self.physical_ids.get(id).map(String::as_str)
    }

    pub fn attribute(&self, id: &ResourceId, name: &str) -> Option<&str> {
        self.attributes
            .get(id)
            .and_then(|attributes| attributes.get(name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.physical_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.physical_ids.is_empty()
    }
}

/// Creates, updates and deletes physical resources from a graph
#[async_trait]
pub trait ProvisioningBackend: Send + Sync {
    async fn apply(&self, graph: &ResourceGraph) -> Result<CommittedStack, ProvisioningError>;
}

/// Uploads site assets and invalidates the CDN cache
#[async_trait]
pub trait AssetSync: Send + Sync {
    async fn sync(&self, local_assets: &Path, target_bucket: &str) -> Result<(), AssetSyncError>;

    async fn invalidate(&self, distribution_id: &str, paths: &[String]) -> Result<(), AssetSyncError>;
}

/// Dry-run backend that commits graphs in memory
///
/// Owned nodes get generated physical ids; imported nodes keep theirs.
/// Every applied graph is recorded.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    applied: Mutex<Vec<ResourceGraph>>,
    unavailable: Option<String>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that rejects every apply
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            unavailable: Some(reason.into()),
        }
    }

    /// Graphs applied so far, oldest first
    pub async fn applied(&self) -> Vec<ResourceGraph> {
        self.applied.lock().await.clone()
    }
}

#[async_trait]
impl ProvisioningBackend for InMemoryBackend {
    async fn apply(&self, graph: &ResourceGraph) -> Result<CommittedStack, ProvisioningError> {
        if let Some(reason) = &self.unavailable {
            return Err(ProvisioningError::Unavailable(reason.clone()));
        }

        let mut committed = CommittedStack::new();
        for node in graph.nodes() {
            let id = node.id();
            let physical_id = match node.physical_id() {
                Some(existing) => existing.to_string(),
                None => generated_physical_id(id, node.kind()),
            };

            committed = committed
                .with_attribute(id, "Id", physical_id.as_str())
                .with_attribute(id, "Arn", format!("arn:dry-run:{}:{}", node.kind(), physical_id));
            match node.kind() {
                ResourceKind::Distribution => {
                    let host = physical_id.to_lowercase();
                    committed = committed
                        .with_attribute(id, "DomainName", format!("{}.cloudfront.net", host));
                }
                ResourceKind::Bucket => {
                    committed = committed.with_attribute(
                        id,
                        "RegionalDomainName",
                        format!("{}.s3.amazonaws.com", physical_id),
                    );
                }
                _ => {}
            }
            committed = committed.with_physical_id(id, physical_id);
        }

        self.applied.lock().await.push(graph.clone());
        debug!("Dry-run backend committed {} resources", committed.len());
        Ok(committed)
    }
}

fn generated_physical_id(id: &ResourceId, kind: ResourceKind) -> String {
    let suffix = Uuid::now_v7().simple().to_string();
    match kind {
        ResourceKind::Distribution => format!("E{}", &suffix[suffix.len() - 13..]).to_uppercase(),
        ResourceKind::Bucket => format!("{}-{}", id.as_str().to_lowercase(), &suffix[suffix.len() - 12..]),
        _ => Uuid::now_v7().to_string(),
    }
}

/// Outcome of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub stack: SiteStack,
    pub committed: CommittedStack,
    /// Output name → concrete value, in emission order
    pub outputs: Vec<(String, String)>,
}

impl Deployment {
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|(output, _)| output == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Build, apply, publish assets and resolve outputs
pub async fn deploy<Z, B, A>(
    config: &SiteConfig,
    zones: &Z,
    backend: &B,
    assets: &A,
    assets_dir: &Path,
) -> StackResult<Deployment>
where
    Z: ZoneLookup + ?Sized,
    B: ProvisioningBackend + ?Sized,
    A: AssetSync + ?Sized,
{
    let stack = SiteStack::build(config, zones)?;

    info!("Applying {} resources", stack.graph.len());
    let committed = backend.apply(&stack.graph).await?;

    let bucket = committed
        .physical_id(&stack.bucket)
        .ok_or_else(|| AssetSyncError::MissingPhysicalId(stack.bucket.clone()))?;
    info!("Syncing {} to bucket {}", assets_dir.display(), bucket);
    assets.sync(assets_dir, bucket).await?;

    let distribution = committed
        .physical_id(&stack.distribution)
        .ok_or_else(|| AssetSyncError::MissingPhysicalId(stack.distribution.clone()))?;
    let paths: Vec<String> = INVALIDATION_PATHS.iter().map(|p| p.to_string()).collect();
    assets.invalidate(distribution, &paths).await?;

    let outputs = resolve_outputs(&stack.outputs, &committed)?;
    Ok(Deployment {
        stack,
        committed,
        outputs,
    })
}

/// Concrete output values, in emission order
///
/// Every output must resolve; a missing committed attribute is an error.
pub fn resolve_outputs(
    outputs: &OutputSet,
    committed: &CommittedStack,
) -> Result<Vec<(String, String)>, ProvisioningError> {
    outputs
        .iter()
        .map(|output| {
            let value = output.resolve(committed)?;
            debug!("Resolved output {} = {}", output.name, value);
            Ok((output.name.clone(), value))
        })
        .collect()
}
