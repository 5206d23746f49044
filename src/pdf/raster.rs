use image::io::Reader as ImageReader;
use image::ImageFormat;
use std::io::Cursor;

use crate::error::{LedgerError, Result};

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Points per inch at raster scale 1.0
pub const BASE_PPI: f64 = 72.0;

/// Width and height in pixels of an encoded PNG
pub fn png_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png)
        .into_dimensions()
        .map_err(|e| LedgerError::PdfExport(format!("rasterized report is unreadable: {e}")))?;
    if width == 0 || height == 0 {
        return Err(LedgerError::PdfExport("rasterized report is empty".to_string()));
    }
    Ok((width, height))
}

/// Height of the raster once scaled to span the page width
pub fn scaled_height_mm(width_px: u32, height_px: u32, page_width_mm: f64) -> f64 {
    f64::from(height_px) * page_width_mm / f64::from(width_px)
}

/// Vertical offset of the raster on each page.
///
/// The first page shows the image from its top; every following page shifts
/// it up by one page height, until the remaining height is used up.
pub fn paginate(image_height_mm: f64, page_height_mm: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    if page_height_mm <= 0.0 {
        return offsets;
    }

    let mut position = 0.0;
    let mut height_left = image_height_mm - page_height_mm;
    while height_left > 0.0 {
        position += page_height_mm;
        offsets.push(position);
        height_left -= page_height_mm;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::new_rgba8(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn reads_png_dimensions() {
        assert_eq!(png_dimensions(&encoded_png(119, 400)).unwrap(), (119, 400));
    }

    #[test]
    fn rejects_non_png() {
        assert!(png_dimensions(b"%PDF-1.7 not an image at all").is_err());
        assert!(png_dimensions(&encoded_png(4, 4)[..20]).is_err());
    }

    #[test]
    fn short_document_is_one_page() {
        assert_eq!(paginate(120.0, A4_HEIGHT_MM), vec![0.0]);
        assert_eq!(paginate(A4_HEIGHT_MM, A4_HEIGHT_MM), vec![0.0]);
    }

    #[test]
    fn tall_document_shifts_one_page_at_a_time() {
        assert_eq!(paginate(700.0, A4_HEIGHT_MM), vec![0.0, 297.0, 594.0]);
        assert_eq!(paginate(594.5, A4_HEIGHT_MM), vec![0.0, 297.0, 594.0]);
    }

    #[test]
    fn height_scales_with_page_width() {
        let h = scaled_height_mm(1190, 2380, A4_WIDTH_MM);
        assert!((h - 420.0).abs() < 1e-9);
    }
}
