use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tools::batch_rename::RenameMode;
use crate::tools::rotate_tool::Axis;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Batch Rename
    pub rename_mode: RenameMode,

    // Rotate Tool
    pub rotate_axis: Axis,
    pub rotate_speed: f64,

    // Material Output
    pub export_extension: String,

    // USD Converter
    pub converter_program: String,
    #[serde(default)]
    pub converter_args: Vec<String>,
    pub converter_output_extension: String,

    // Meta
    pub log_level: String,
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rename_mode: RenameMode::default(),
            rotate_axis: Axis::default(),
            rotate_speed: 0.5,
            export_extension: "ovmt".to_string(),
            converter_program: "asset-converter".to_string(),
            converter_args: Vec::new(),
            converter_output_extension: "usd".to_string(),
            log_level: "INFO".to_string(),
            audit_log: true,
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path
    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                // Keep the broken file around for inspection
                let backup_path = config_path.with_extension("json.corrupt");
                let _ = std::fs::rename(config_path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to file
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Turntable speed clamped to the slider range
    pub fn clamped_rotate_speed(&self) -> f64 {
        self.rotate_speed.clamp(0.1, 1.0)
    }

    /// Parse `log_level` into a tracing level, falling back to INFO
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vrtools")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}
