// filepath: src/config.rs
//! Configuration handling for lintel
//!
//! This file defines the configuration structure and provides
//! functionality to load and save configuration from/to files.
//! Colors are given as "#rrggbb" / "#rrggbbaa" strings and resolved
//! into a `Palette` before drawing.

use crate::color::{Color, ColorError};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Path to a TTF file; when absent, well-known system fonts are tried.
    pub path: Option<PathBuf>,
    pub size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            size: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub background: String,
    pub foreground: String,
    pub separator: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: "#000000".to_string(),
            foreground: "#ffffff".to_string(),
            separator: "#666666".to_string(),
        }
    }
}

/// Resolved colors with no string fields
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub separator: Color,
}

/// Configuration for the bar appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    pub height: u32,
    pub font: FontConfig,
    pub colors: ColorsConfig,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            height: 28,
            font: FontConfig::default(),
            colors: ColorsConfig::default(),
        }
    }
}

impl BarConfig {
    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        let config_dir = if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("lintel")
        } else {
            PathBuf::from(".config/lintel")
        };

        config_dir.join("config.toml")
    }

    /// Load configuration from file, returning default if not found
    pub fn load_from_file() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();

        match fs::read_to_string(&config_path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // If the file doesn't exist, create it with default values
                let default_config = Self::default();
                default_config.save_to_file()?;
                Ok(default_config)
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();

        if let Some(parent) = config_path.parent() {
            if !Path::exists(parent) {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    /// Parse the configured hex colors into a drawable palette.
    pub fn palette(&self) -> Result<Palette, ColorError> {
        Ok(Palette {
            background: Color::from_hex(&self.colors.background)?,
            foreground: Color::from_hex(&self.colors.foreground)?,
            separator: Color::from_hex(&self.colors.separator)?,
        })
    }
}
