use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::op::{Operation, ParagraphStyle};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub document: DocumentConfig,
    pub cover: CoverConfig,
    pub images: ImagesConfig,
    pub table: TableConfig,
    pub alerts: AlertsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub font: String,
    /// Body text size in points.
    pub size: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            font: "Calibri".to_string(),
            size: 11,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CoverConfig {
    pub title: String,
    pub subtitle: String,
}

impl CoverConfig {
    /// Title, subtitle and page break, or nothing when no title is set.
    pub fn operations(&self) -> Vec<Operation> {
        if self.title.trim().is_empty() {
            return Vec::new();
        }
        let mut ops = vec![Operation::heading(0, self.title.trim())];
        if !self.subtitle.trim().is_empty() {
            ops.push(Operation::Paragraph {
                text: self.subtitle.trim().to_string(),
                style: ParagraphStyle::Subtitle,
            });
        }
        ops.push(Operation::PageBreak);
        ops
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Rendered width in inches; height follows the aspect ratio.
    pub width: f64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { width: 6.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub header_fill: String,
    pub header_text: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            header_fill: "4F81BD".to_string(),
            header_text: "FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub note: String,
    pub tip: String,
    pub warning: String,
    pub important: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            note: "E3F2FD".to_string(),
            tip: "E8F5E9".to_string(),
            warning: "FFF3E0".to_string(),
            important: "FFEBEE".to_string(),
        }
    }
}

impl AlertsConfig {
    /// Fill colour for an alert kind. Unknown kinds use the note colour.
    pub fn fill_for(&self, kind: &str) -> &str {
        let kind = kind.to_ascii_uppercase();
        if kind.contains("IMPORTANT") || kind.contains("CAUTION") {
            &self.important
        } else if kind.contains("WARNING") {
            &self.warning
        } else if kind.contains("TIP") {
            &self.tip
        } else {
            &self.note
        }
    }
}

impl Config {
    /// The defaults shipped in `default_config.toml`.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::Config)
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                info!("using config {}", path.display());
                Self::from_toml(&content)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(e) => Err(Error::io(path, e)),
        }
    }
}
