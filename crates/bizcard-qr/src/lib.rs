//! QR codes for card share URLs.
//!
//! `render` produces a [`QrImage`]: the SVG markup plus the module matrix it
//! was drawn from. Rasterizing works from the matrix, painting modules onto
//! a square white canvas and encoding PNG, so no SVG parser is involved.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use image::{ImageFormat, Rgb, RgbImage};
use qrcode::QrCode;
use qrcode::render::svg;
use thiserror::Error;

/// Light modules around the symbol (ISO/IEC 18004 minimum).
pub const QUIET_ZONE: usize = 4;

const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Error)]
pub enum QrError {
    #[error("cannot encode QR data: {0}")]
    Encode(String),
    #[error("image size must be positive")]
    ZeroSize,
    #[error("image size {size}px is below the {minimum}px needed for one pixel per module")]
    SizeTooSmall { size: u32, minimum: u32 },
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// A rendered QR code in vector form.
#[derive(Debug, Clone)]
pub struct QrImage {
    data: String,
    svg: String,
    width: usize,
    modules: Vec<bool>,
}

/// Render `data` (normally a share URL) as an SVG at least `size` px square.
pub fn render(data: &str, size: u32) -> Result<QrImage, QrError> {
    if size == 0 {
        return Err(QrError::ZeroSize);
    }

    let code = QrCode::new(data.as_bytes()).map_err(|e| QrError::Encode(e.to_string()))?;

    let svg = code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();

    Ok(QrImage {
        data: data.to_string(),
        svg,
        width: code.width(),
        modules,
    })
}

impl QrImage {
    /// The encoded payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// `data:` URL for embedding the SVG in an `img` tag.
    pub fn svg_data_url(&self) -> String {
        format!("data:image/svg+xml;base64,{}", B64.encode(self.svg.as_bytes()))
    }

    /// Modules per side, without the quiet zone.
    pub fn module_count(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Smallest canvas that still gives every module one pixel.
    pub fn min_raster_size(&self) -> u32 {
        (self.width + 2 * QUIET_ZONE) as u32
    }

    /// Paint the code onto a `size`×`size` white canvas.
    pub fn rasterize(&self, size: u32) -> Result<RgbImage, QrError> {
        if size == 0 {
            return Err(QrError::ZeroSize);
        }
        let minimum = self.min_raster_size();
        if size < minimum {
            return Err(QrError::SizeTooSmall { size, minimum });
        }

        let total = minimum as u64;
        let mut canvas = RgbImage::from_pixel(size, size, WHITE);
        for (px, py, pixel) in canvas.enumerate_pixels_mut() {
            let mx = (px as u64 * total / size as u64) as usize;
            let my = (py as u64 * total / size as u64) as usize;
            let inside = (QUIET_ZONE..QUIET_ZONE + self.width).contains(&mx)
                && (QUIET_ZONE..QUIET_ZONE + self.width).contains(&my);
            if inside && self.is_dark(mx - QUIET_ZONE, my - QUIET_ZONE) {
                *pixel = DARK;
            }
        }
        Ok(canvas)
    }

    /// Rasterize and encode as PNG.
    pub fn to_png(&self, size: u32) -> Result<Vec<u8>, QrError> {
        let canvas = self.rasterize(size)?;
        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://cards.example/card/6f1c1f0e-8a55-4c0e-9d1e-2b3f4a5b6c7d";

    #[test]
    fn render_produces_svg() {
        let qr = render(URL, 256).unwrap();
        assert!(qr.svg().contains("<svg"));
        assert_eq!(qr.data(), URL);
        assert!(qr.svg_data_url().starts_with("data:image/svg+xml;base64,"));
        // Version-dependent, but always 21 + 4k modules.
        assert_eq!((qr.module_count() - 21) % 4, 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(render(URL, 0), Err(QrError::ZeroSize)));
    }

    #[test]
    fn raster_has_white_border_and_dark_finder() {
        let qr = render(URL, 256).unwrap();
        let size = qr.min_raster_size() * 4;
        let canvas = qr.rasterize(size).unwrap();

        assert_eq!(canvas.dimensions(), (size, size));
        assert_eq!(*canvas.get_pixel(0, 0), WHITE);
        assert_eq!(*canvas.get_pixel(size - 1, size - 1), WHITE);

        // Top-left finder pattern starts right after the quiet zone.
        let finder = (QUIET_ZONE as u32) * 4 + 1;
        assert!(qr.is_dark(0, 0));
        assert_eq!(*canvas.get_pixel(finder, finder), DARK);
    }

    #[test]
    fn raster_too_small_is_an_error() {
        let qr = render(URL, 256).unwrap();
        let err = qr.rasterize(10).unwrap_err();
        assert!(matches!(err, QrError::SizeTooSmall { size: 10, .. }));
    }

    #[test]
    fn png_output_decodes() {
        let qr = render(URL, 256).unwrap();
        let png = qr.to_png(300).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (300, 300));
    }
}
