//! QR rendering of the prefixed text form.
//!
//! Exists for rendering-fidelity tests only; a verifier consuming the
//! text form directly never needs this stage.

use base64::prelude::{Engine, BASE64_STANDARD};
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::error::VisualEncodingError;

/// Pixels per QR module.
const MODULE_SIZE: u32 = 3;
/// Quiet-zone width, in modules.
const BORDER: u32 = 2;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Renders `data` as a QR code (error-correction level Q) and returns
/// the PNG image as a base64 string.
pub fn render_png_base64(data: &str) -> Result<String, VisualEncodingError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::Q)
        .map_err(|e| VisualEncodingError::Qr(e.to_string()))?;
    let width = code.width() as u32;
    let modules = code.to_colors();

    let size = (width + 2 * BORDER) * MODULE_SIZE;
    let image = GrayImage::from_fn(size, size, |x, y| {
        let mx = x / MODULE_SIZE;
        let my = y / MODULE_SIZE;
        if mx < BORDER || my < BORDER || mx >= BORDER + width || my >= BORDER + width {
            return LIGHT;
        }
        let index = ((my - BORDER) * width + (mx - BORDER)) as usize;
        if modules[index] == Color::Dark {
            DARK
        } else {
            LIGHT
        }
    });

    let mut png = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(BASE64_STANDARD.encode(png))
}
