use serde::{Deserialize, Serialize};

use super::services::{AiSettings, ConfirmationSettings};
use super::session::SessionSettings;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub company: Company,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub confirmation: ConfirmationSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Rasterization scale for PDF export (1.0 = 72 ppi)
    #[serde(default = "default_raster_scale")]
    pub raster_scale: f64,
    /// Command used for the print export
    #[serde(default)]
    pub print_command: Option<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            raster_scale: default_raster_scale(),
            print_command: None,
        }
    }
}

fn default_currency_symbol() -> String {
    "₦".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_raster_scale() -> f64 {
    2.0
}
