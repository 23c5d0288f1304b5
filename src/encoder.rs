//! Turning card URLs into scannable raster codes.

use async_trait::async_trait;
use image::imageops::overlay;
use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// How much of the code may be damaged while it still scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorTolerance {
    Low,
    Medium,
    Quartile,
    High,
}

impl From<ErrorTolerance> for EcLevel {
    fn from(value: ErrorTolerance) -> EcLevel {
        match value {
            ErrorTolerance::Low => EcLevel::L,
            ErrorTolerance::Medium => EcLevel::M,
            ErrorTolerance::Quartile => EcLevel::Q,
            ErrorTolerance::High => EcLevel::H,
        }
    }
}

/// Resolution and robustness of the generated code image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub error_tolerance: ErrorTolerance,
    /// Target side length of the square image in pixels.
    pub pixel_size: u32,
    /// Light border around the code, in modules.
    pub margin_modules: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            error_tolerance: ErrorTolerance::High,
            pixel_size: 400,
            margin_modules: 1,
        }
    }
}

/// Produces a raster code for a URL.
#[async_trait]
pub trait CodeEncoder: Send + Sync {
    async fn encode(&self, url: &str, options: &EncodeOptions) -> Result<GrayImage, EncodeError>;
}

/// QR encoder running on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl QrEncoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeEncoder for QrEncoder {
    async fn encode(&self, url: &str, options: &EncodeOptions) -> Result<GrayImage, EncodeError> {
        let url = url.to_owned();
        let options = options.clone();
        tokio::task::spawn_blocking(move || encode_qr(&url, &options))
            .await
            .map_err(|err| EncodeError::Task(err.to_string()))?
    }
}

/// Encode `data` as a square QR image.
///
/// Modules are whole pixels, so the image is `pixel_size` wide unless the
/// code needs more than one pixel per module at that size.
pub fn encode_qr(data: &str, options: &EncodeOptions) -> Result<GrayImage, EncodeError> {
    if data.is_empty() {
        return Err(EncodeError::EmptyInput);
    }
    let code = QrCode::with_error_correction_level(data.as_bytes(), options.error_tolerance.into())
        .map_err(|err| EncodeError::Qr(err.to_string()))?;

    let modules = code.width() as u32;
    let total_modules = modules + 2 * options.margin_modules;
    let module_px = (options.pixel_size / total_modules).max(1);
    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(module_px, module_px)
        .build();

    let side = options.pixel_size.max(total_modules * module_px);
    let mut canvas = GrayImage::from_pixel(side, side, Luma([255]));
    let offset = (side - symbol.width()) / 2;
    overlay(&mut canvas, &symbol, offset as i64, offset as i64);
    Ok(canvas)
}
