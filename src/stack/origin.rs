// Copyright (c) 2025 - Cowboy AI, Inc.
//! Origin storage and its read-identity
//!
//! The bucket is private: the distribution reaches it through an origin
//! access identity that is granted read access by bucket policy. The bucket
//! is retained when the stack is deleted since it will usually not be empty.

use serde_json::json;

use crate::errors::GraphError;
use crate::graph::{ResourceGraph, ResourceId, ResourceKind, ResourceNode};

pub const BUCKET_ID: &str = "webBucket";
pub const IDENTITY_ID: &str = "oai";
pub const BUCKET_POLICY_ID: &str = "webBucketPolicy";

/// Actions granted to the read-identity
const READ_ACTIONS: [&str; 3] = ["s3:GetObject*", "s3:GetBucket*", "s3:List*"];

/// Identifiers of the origin nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub bucket: ResourceId,
    pub identity: ResourceId,
    pub policy: ResourceId,
}

pub fn build(graph: &mut ResourceGraph) -> Result<Origin, GraphError> {
    let bucket = graph.add(
        ResourceNode::new(BUCKET_ID, ResourceKind::Bucket)
            .with_property(
                "PublicAccessBlockConfiguration",
                json!({
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true,
                }),
            )
            .retained(),
    )?;

    let identity = graph.add(
        ResourceNode::new(IDENTITY_ID, ResourceKind::OriginAccessIdentity).with_property(
            "CloudFrontOriginAccessIdentityConfig",
            json!({ "Comment": "Site distribution read identity" }),
        ),
    )?;

    let node = grant_read(graph, &bucket, &identity)?;
    let policy = graph.add(node)?;

    Ok(Origin {
        bucket,
        identity,
        policy,
    })
}

fn grant_read(
    graph: &ResourceGraph,
    bucket: &ResourceId,
    identity: &ResourceId,
) -> Result<ResourceNode, GraphError> {
    let bucket_arn = graph.attribute(bucket, "Arn")?;
    let canonical_user = graph.attribute(identity, "S3CanonicalUserId")?;

    Ok(ResourceNode::new(BUCKET_POLICY_ID, ResourceKind::BucketPolicy)
        .with_property("Bucket", graph.reference(bucket)?)
        .with_property(
            "PolicyDocument",
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Action": READ_ACTIONS,
                    "Effect": "Allow",
                    "Principal": { "CanonicalUser": canonical_user },
                    "Resource": [
                        bucket_arn,
                        { "Fn::Join": ["", [bucket_arn, "/*"]] },
                    ],
                }],
            }),
        )
        .depends_on(bucket)
        .depends_on(identity))
}
