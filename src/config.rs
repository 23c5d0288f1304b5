//! Sheet configuration, loadable from TOML.
//!
//! ```toml
//! [grid]
//! padding_mm = 12.0
//!
//! [back]
//! code_size_mm = 40.0
//!
//! [code]
//! error_tolerance = "high"
//! ```
//!
//! Every field has a default, so an empty file yields the A4 layout.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::encoder::EncodeOptions;
use crate::error::GenerateError;
use crate::faces::{BackStyle, FrontStyle};
use crate::layout::{Face, GridConfig};
use crate::marks::MarkStyle;

pub const DEFAULT_FILE_NAME: &str = "playlist-qr-cards.pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file_name: String,
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            title: "Playlist QR Cards".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub grid: GridConfig,
    pub marks: MarkStyle,
    pub front: FrontStyle,
    pub back: BackStyle,
    pub code: EncodeOptions,
    pub output: OutputConfig,
}

impl SheetConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("failed to parse sheet configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject layouts whose grid, code inset or text area cannot fit.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let grid = &self.grid;
        let invalid =
            |msg: String| -> Result<(), GenerateError> { Err(GenerateError::InvalidLayout(msg)) };

        if grid.columns == 0 || grid.rows == 0 {
            return invalid(format!(
                "grid needs at least one row and column (got {}x{})",
                grid.columns, grid.rows
            ));
        }
        if grid.card_width_mm <= 0.0 || grid.card_height_mm <= 0.0 || grid.padding_mm < 0.0 {
            return invalid("card sizes must be positive and padding non-negative".to_string());
        }
        let span = grid.grid_rect(Face::Front);
        if span.right() + grid.padding_mm > grid.page_width_mm + f32::EPSILON {
            return invalid(format!(
                "{} columns of {}mm with {}mm padding exceed page width {}mm",
                grid.columns, grid.card_width_mm, grid.padding_mm, grid.page_width_mm
            ));
        }
        if span.bottom() + grid.padding_mm > grid.page_height_mm + f32::EPSILON {
            return invalid(format!(
                "{} rows of {}mm with {}mm padding exceed page height {}mm",
                grid.rows, grid.card_height_mm, grid.padding_mm, grid.page_height_mm
            ));
        }
        let code = self.back.code_size_mm;
        if code <= 0.0 || code > grid.card_width_mm || code > grid.card_height_mm {
            return invalid(format!(
                "code size {}mm does not fit a {}x{}mm card",
                code, grid.card_width_mm, grid.card_height_mm
            ));
        }
        if self.front.text_inset_mm >= grid.card_width_mm {
            return invalid(format!(
                "text inset {}mm leaves no room on a {}mm card",
                self.front.text_inset_mm, grid.card_width_mm
            ));
        }
        if self.code.pixel_size == 0 {
            return invalid("code pixel size must be positive".to_string());
        }
        Ok(())
    }
}
