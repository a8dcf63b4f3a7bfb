// Copyright (c) 2025 - Cowboy AI, Inc.
//! Site Stack Synthesizer
//!
//! Reads a site configuration, builds the stack and prints the synthesized
//! template to stdout. Logs go to stderr.
//!
//! Run with: cargo run --bin site-synth
//!
//! Environment:
//! - `SITE_CONFIG` - configuration file (default: `options.json`)
//! - `SITE_CONTEXT` - hosted zone context file, required when `createDns` is set
//! - `CDK_DEFAULT_REGION` / `CDK_DEFAULT_ACCOUNT` - fallbacks for `region` / `account`

use anyhow::{Context, Result};
use cim_site_stack::{template, SiteConfig, SiteStack, StaticZoneLookup};
use tracing::info;

/// Locations of the input documents
#[derive(Debug, Clone)]
struct SynthConfig {
    config_path: String,
    context_path: Option<String>,
}

impl SynthConfig {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            config_path: std::env::var("SITE_CONFIG").unwrap_or_else(|_| "options.json".to_string()),
            context_path: std::env::var("SITE_CONTEXT").ok(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let synth = SynthConfig::from_env();
    info!("Loading site configuration from {}", synth.config_path);

    let config = SiteConfig::from_file(&synth.config_path)
        .context("Failed to load site configuration")?
        .apply_env_defaults(|key| std::env::var(key).ok())
        .require_region()?;
    info!(
        "Building stack for {:?} in {}",
        config.svc_name, config.region
    );

    let zones = match &synth.context_path {
        Some(path) => StaticZoneLookup::from_file(path).context("Failed to load zone context")?,
        None => StaticZoneLookup::new(),
    };

    let stack = SiteStack::build(&config, &zones).context("Failed to build site stack")?;
    let rendered = serde_json::to_string_pretty(&template::synthesize(&stack))?;
    println!("{}", rendered);

    info!(
        "Synthesized {} resources with outputs {:?}",
        stack.graph.len(),
        stack.outputs.names()
    );
    Ok(())
}
