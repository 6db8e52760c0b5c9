//! Generator configuration
//!
//! Settings can come from a JSON file and are then overridden by command-line
//! flags. Nothing here is global: the config is passed explicitly into the
//! renderer.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::render::RenderOptions;

/// Output produced by a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rust source for the agent.
    #[default]
    Rust,
    /// The synthesized agent spec as JSON.
    Spec,
}

/// Configuration for the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Module path holding the wrapped interface and its constructors
    /// (default: `super`)
    pub package: Option<String>,

    /// Module path of the runtime support types
    pub runtime_path: String,

    /// Inline the runtime support source instead of importing it
    pub emit_lifecycle: bool,

    /// Constructors to emit factories for
    pub constructors: Vec<String>,

    /// What to write
    pub format: OutputFormat,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: None,
            runtime_path: "gadget::runtime".to_string(),
            emit_lifecycle: false,
            constructors: Vec::new(),
            format: OutputFormat::Rust,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Write this configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Options for the renderer
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            import_path: self.package.clone().unwrap_or_else(|| "super".to_string()),
            runtime_path: self.runtime_path.clone(),
            emit_lifecycle: self.emit_lifecycle,
        }
    }
}
