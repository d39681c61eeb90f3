use color_eyre::eyre::Result;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// Pixel size of a single QR module.
pub const QR_MODULE_SIZE: u32 = 10;

/// Renders `data` as a QR code (error correction L, quiet zone included) and
/// encodes it as PNG.
///
/// # Errors
///
/// Returns an error if the data does not fit in a QR code or PNG encoding fails.
pub fn render_qr_png(data: &str) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)?;
    let bitmap = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(QR_MODULE_SIZE, QR_MODULE_SIZE)
        .build();

    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(bitmap).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_square_png() {
        let png = render_qr_png("https://eventvault.com/upload/AB12CD34").unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);

        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % QR_MODULE_SIZE, 0);
        // Smallest QR version is 21 modules plus a 4 module quiet zone each side.
        assert!(img.width() >= 29 * QR_MODULE_SIZE);
    }

    #[test]
    fn different_urls_render_differently() {
        let a = render_qr_png("https://eventvault.com/upload/AAAAAAAA").unwrap();
        let b = render_qr_png("https://eventvault.com/upload/BBBBBBBB").unwrap();
        assert_ne!(a, b);
    }
}
