//! PNG export of the visible surface.

use crate::error::AppResult;
use std::path::Path;
use strata_core::Session;

/// Encode straight-alpha RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> AppResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}

/// Write the session's current composite to `path`.
pub fn export_png(session: &Session, path: &Path) -> AppResult<usize> {
    let surface = session.compositor().surface();
    let png_data = encode_png(&session.pixels(), surface.width(), surface.height())?;
    std::fs::write(path, &png_data)?;
    log::info!("PNG export complete: {} bytes to {}", png_data.len(), path.display());
    Ok(png_data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_header() {
        let pixels = vec![255u8; 2 * 3 * 4];
        let data = encode_png(&pixels, 2, 3).unwrap();
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_encode_png_wrong_length() {
        assert!(encode_png(&[0u8; 5], 2, 2).is_err());
    }
}
