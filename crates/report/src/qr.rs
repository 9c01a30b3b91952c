//! QR code rasterization

use crate::{ReportError, Result};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Turns a URL into a PNG image of its QR code
pub trait QrRasterizer: Send + Sync {
    fn rasterize(&self, data: &str) -> Result<Vec<u8>>;
}

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(ec: ErrorCorrection) -> Self {
        match ec {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Rasterizer backed by the `qrcode` crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrCodeRasterizer {
    /// Minimum edge length of the PNG in pixels
    pub min_size: u32,
    pub quiet_zone: bool,
    pub error_correction: ErrorCorrection,
}

impl Default for QrCodeRasterizer {
    fn default() -> Self {
        Self {
            min_size: 200,
            quiet_zone: true,
            error_correction: ErrorCorrection::M,
        }
    }
}

impl QrRasterizer for QrCodeRasterizer {
    fn rasterize(&self, data: &str) -> Result<Vec<u8>> {
        let code =
            QrCode::with_error_correction_level(data.as_bytes(), self.error_correction.into())
                .map_err(|e| ReportError::QrCodeError(e.to_string()))?;

        let image = code
            .render::<Luma<u8>>()
            .quiet_zone(self.quiet_zone)
            .min_dimensions(self.min_size, self.min_size)
            .build();

        let mut bytes: Vec<u8> = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ReportError::QrCodeError(e.to_string()))?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterize_png() {
        let png = QrCodeRasterizer::default()
            .rasterize("https://event-rate-pro.vercel.app/choose-role/q/1")
            .unwrap();

        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&png).unwrap();
        assert!(decoded.width() >= 200);
        assert_eq!(decoded.width(), decoded.height());
    }

    #[test]
    fn test_payload_too_large() {
        let huge = "x".repeat(8000);
        let result = QrCodeRasterizer::default().rasterize(&huge);
        assert!(matches!(result, Err(ReportError::QrCodeError(_))));
    }

    #[test]
    fn test_error_correction_from_config() {
        let rasterizer: QrCodeRasterizer =
            serde_json::from_str(r#"{"error_correction": "H"}"#).unwrap();
        assert_eq!(rasterizer.error_correction, ErrorCorrection::H);
        assert_eq!(rasterizer.min_size, 200);
        assert_eq!(EcLevel::from(ErrorCorrection::L), EcLevel::L);
    }
}
