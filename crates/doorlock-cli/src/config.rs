//! Node settings from an optional JSON file plus command-line overrides.

use std::path::Path;

use anyhow::Context;
use doorlock_emulator::{ControlConfig, HmiConfig, TimingConfig};
use doorlock_link::LinkConfig;
use serde::de::DeserializeOwned;

use crate::NodeArgs;

/// A node configuration the binary can load and override.
pub trait NodeSettings: DeserializeOwned + Default {
    fn timing_mut(&mut self) -> &mut TimingConfig;

    fn validate(&self) -> doorlock_core::Result<()>;
}

impl NodeSettings for ControlConfig {
    fn timing_mut(&mut self) -> &mut TimingConfig {
        &mut self.timing
    }

    fn validate(&self) -> doorlock_core::Result<()> {
        ControlConfig::validate(self)
    }
}

impl NodeSettings for HmiConfig {
    fn timing_mut(&mut self) -> &mut TimingConfig {
        &mut self.timing
    }

    fn validate(&self) -> doorlock_core::Result<()> {
        HmiConfig::validate(self)
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Build the node settings: file (or defaults), then flags, then validation.
pub fn load<T: NodeSettings>(args: &NodeArgs) -> anyhow::Result<T> {
    let mut config = match &args.config {
        Some(path) => read_file(path)?,
        None => T::default(),
    };

    if let Some(tick_ms) = args.tick_ms {
        config.timing_mut().tick_period_ms = tick_ms;
    }

    config.validate().context("Invalid node settings")?;
    Ok(config)
}

pub fn link_config(args: &NodeArgs) -> LinkConfig {
    LinkConfig {
        recv_timeout_ms: args.link_timeout_ms,
        ..LinkConfig::default()
    }
}
