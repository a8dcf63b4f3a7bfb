// Copyright (c) 2025 - Cowboy AI, Inc.
//! Static site stack composition for the Composable Information Machine
//!
//! Turns one declarative [`SiteConfig`] into a validated graph of cloud
//! resources serving a static site behind a CDN distribution, with optional
//! custom domain, TLS certificate, IP allowlist and DNS alias.
//!
//! # Modules
//!
//! - [`config`] - configuration document and loading
//! - [`stack`] - the composition pipeline and its stages
//! - [`graph`] - append-only resource graph
//! - [`outputs`] - named stack outputs
//! - [`template`] - template synthesis
//! - [`deploy`] - provisioning backend and asset sync collaborators
//!
//! # Example
//!
//! ```rust
//! use cim_site_stack::{SiteConfig, SiteStack, StaticZoneLookup};
//!
//! let config = SiteConfig {
//!     svc_name: "web-demo".to_string(),
//!     region: "us-east-1".to_string(),
//!     ..Default::default()
//! };
//! let stack = SiteStack::build(&config, &StaticZoneLookup::new()).unwrap();
//! assert_eq!(stack.outputs.names(), vec!["defaultUrl"]);
//! ```

pub mod config;
pub mod deploy;
pub mod errors;
pub mod graph;
pub mod outputs;
pub mod stack;
pub mod template;

// Re-export commonly used types
pub use config::{SiteConfig, CDN_REGION};
pub use deploy::{deploy, AssetSync, CommittedStack, Deployment, InMemoryBackend, ProvisioningBackend};
pub use errors::{
    AssetSyncError, ConfigurationError, GraphError, OverlayError, ProvisioningError, StackError,
    StackResult, ZoneLookupError,
};
pub use graph::{ResourceGraph, ResourceId, ResourceKind, ResourceNode};
pub use outputs::{Output, OutputSet, OutputValue};
pub use stack::{CertificateStrategy, SiteStack, StaticZoneLookup, Zone, ZoneLookup};
