//! Configuration management for Orbit
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files: shell behaviour, the outputs and seats of the headless
//! compositor model, and general settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::Rectangle;

/// Most workspaces a configuration may ask for up front
pub const MAX_WORKSPACES: u32 = 32;

/// Main configuration struct containing all Orbit settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrbitConfig {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Window management behaviour
    #[serde(default)]
    pub shell: ShellConfig,

    /// Outputs of the compositor model, in enumeration order
    #[serde(default = "OrbitConfig::default_outputs")]
    pub outputs: Vec<OutputConfig>,

    /// Seats of the compositor model
    #[serde(default = "OrbitConfig::default_seats")]
    pub seats: Vec<SeatConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneralConfig {
    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellConfig {
    /// Clicking a window focuses it without raising it
    #[serde(default)]
    pub separate_raise: bool,

    /// Number of workspaces created at start (1-32)
    #[serde(default = "ShellConfig::default_workspaces")]
    pub workspaces: u32,

    /// Let the kill binding really signal client processes
    #[serde(default)]
    pub kill_clients: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    pub name: String,

    #[serde(default)]
    pub x: i32,

    #[serde(default)]
    pub y: i32,

    pub width: u32,
    pub height: u32,

    /// Rows taken by panels at the top edge
    #[serde(default)]
    pub reserved_top: u32,

    /// Rows taken by panels at the bottom edge
    #[serde(default)]
    pub reserved_bottom: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeatConfig {
    pub name: String,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            shell: ShellConfig::default(),
            outputs: Self::default_outputs(),
            seats: Self::default_seats(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            separate_raise: false,
            workspaces: Self::default_workspaces(),
            kill_clients: false,
        }
    }
}

impl ShellConfig {
    fn default_workspaces() -> u32 {
        4
    }
}

impl OutputConfig {
    pub fn new(name: impl Into<String>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
            reserved_top: 0,
            reserved_bottom: 0,
        }
    }

    pub fn geometry(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    /// Geometry minus the reserved panel rows
    pub fn available_geometry(&self) -> Rectangle {
        let reserved = self.reserved_top.saturating_add(self.reserved_bottom);
        Rectangle::new(
            self.x,
            self.y.saturating_add(self.reserved_top as i32),
            self.width,
            self.height.saturating_sub(reserved),
        )
    }
}

impl OrbitConfig {
    fn default_outputs() -> Vec<OutputConfig> {
        vec![OutputConfig::new("HEADLESS-1", 0, 0, 1920, 1080)]
    }

    fn default_seats() -> Vec<SeatConfig> {
        vec![SeatConfig {
            name: "seat0".to_string(),
        }]
    }

    /// Expand a leading `~` to the home directory
    pub fn expand_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if !path.to_string_lossy().starts_with('~') {
            return Ok(path.to_path_buf());
        }
        let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
        let rest = path.strip_prefix("~").unwrap_or(path);
        Ok(Path::new(&home).join(rest))
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let expanded_path = Self::expand_path(path)?;

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: OrbitConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.shell.workspaces == 0 || self.shell.workspaces > MAX_WORKSPACES {
            anyhow::bail!(
                "Invalid workspaces: must be between 1 and {}",
                MAX_WORKSPACES
            );
        }

        let mut names = HashSet::new();
        for output in &self.outputs {
            if output.width == 0 || output.height == 0 {
                anyhow::bail!("Output {} has an empty geometry", output.name);
            }
            if output.reserved_top.saturating_add(output.reserved_bottom) >= output.height {
                anyhow::bail!(
                    "Output {}: reserved rows leave no available area",
                    output.name
                );
            }
            if !names.insert(output.name.as_str()) {
                anyhow::bail!("Duplicate output name: {}", output.name);
            }
        }

        if self.seats.iter().any(|s| s.name.trim().is_empty()) {
            anyhow::bail!("Seat names must not be empty");
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Merge a partial configuration into this one
    /// Sections of the partial config that differ from the defaults win
    pub fn merge_partial(mut self, partial: OrbitConfig) -> Self {
        let default_config = OrbitConfig::default();

        if partial.general != default_config.general {
            self.general = partial.general;
        }
        if partial.shell != default_config.shell {
            self.shell = partial.shell;
        }
        if partial.outputs != default_config.outputs {
            self.outputs = partial.outputs;
        }
        if partial.seats != default_config.seats {
            self.seats = partial.seats;
        }

        self
    }
}


#[cfg(test)]
mod property_tests;
