//! Loading the device configuration on the host

use anyhow::{Context, Result};
use std::path::Path;

use mf_core::DeviceConfig;

use crate::args::HostArgs;

/// Read a JSON config file; missing fields take their defaults
pub fn load_config_file(path: &Path) -> Result<DeviceConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Config file (or defaults) with command-line overrides applied
pub fn resolve_config(args: &HostArgs) -> Result<DeviceConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => DeviceConfig::default(),
    };

    if let Some(capacity) = args.capacity {
        config.buffer_capacity = capacity;
    }
    if args.no_echo {
        config.echo = false;
    }
    if let Some(mode) = args.mode {
        config.input_mode = mode.into();
    }

    if config.buffer_capacity == 0 {
        anyhow::bail!("Buffer capacity must be at least 1");
    }
    Ok(config)
}
