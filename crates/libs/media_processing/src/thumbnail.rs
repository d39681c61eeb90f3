use color_eyre::eyre::{Result, eyre};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, RgbImage};
use std::path::Path;

/// An encoded JPEG thumbnail and its final dimensions.
#[derive(Debug, Clone)]
pub struct JpegThumbnail {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Scales `(width, height)` so the longest side is at most `max_side`,
/// keeping the aspect ratio. Never upscales, never returns a zero side.
#[must_use]
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || longest == 0 {
        return (width.max(1), height.max(1));
    }
    let scale = |side: u32| {
        let scaled = (u64::from(side) * u64::from(max_side) + u64::from(longest) / 2)
            / u64::from(longest);
        (scaled as u32).max(1)
    };
    (scale(width), scale(height))
}

fn apply_orientation(img: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation.unwrap_or(1) {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Decodes the image at `input_path`, corrects its EXIF orientation and encodes
/// a JPEG whose longest side is at most `max_side`. Transparency is dropped.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded, resized or encoded.
pub fn generate_jpeg_thumbnail(
    input_path: &Path,
    max_side: u32,
    quality: u8,
    orientation: Option<u32>,
) -> Result<JpegThumbnail> {
    let img = ImageReader::open(input_path)?
        .with_guessed_format()?
        .decode()?;
    let src = apply_orientation(img, orientation).into_rgb8();
    let (orig_w, orig_h) = src.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(eyre!("source image has a zero dimension"));
    }

    let (target_w, target_h) = fit_within(orig_w, orig_h, max_side);
    let resized = if (target_w, target_h) == (orig_w, orig_h) {
        src
    } else {
        let src_image = Image::from_vec_u8(orig_w, orig_h, src.into_raw(), PixelType::U8x3)?;
        let mut dst_image = Image::new(target_w, target_h, PixelType::U8x3);
        Resizer::new().resize(&src_image, &mut dst_image, None)?;
        RgbImage::from_raw(target_w, target_h, dst_image.into_vec())
            .ok_or_else(|| eyre!("Failed to construct resized image"))?
    };

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&resized)?;

    Ok(JpegThumbnail {
        bytes,
        width: target_w,
        height: target_h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        assert_eq!(fit_within(800, 400, 300), (300, 150));
        assert_eq!(fit_within(400, 800, 300), (150, 300));
        assert_eq!(fit_within(300, 300, 300), (300, 300));
        assert_eq!(fit_within(120, 80, 300), (120, 80));
        assert_eq!(fit_within(10_000, 1, 300), (300, 1));
    }

    #[test]
    fn large_image_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbImage::from_pixel(800, 400, image::Rgb([200, 100, 50]))
            .save(&path)
            .unwrap();

        let thumb = generate_jpeg_thumbnail(&path, 300, 85, None).unwrap();
        assert_eq!((thumb.width, thumb.height), (300, 150));

        let decoded = image::load_from_memory(&thumb.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 150));
    }

    #[test]
    fn small_transparent_image_is_not_upscaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        RgbaImage::from_pixel(40, 20, Rgba([0, 0, 255, 128]))
            .save(&path)
            .unwrap();

        let thumb = generate_jpeg_thumbnail(&path, 300, 85, None).unwrap();
        assert_eq!((thumb.width, thumb.height), (40, 20));
        assert_eq!(
            image::guess_format(&thumb.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn rotated_orientation_swaps_sides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portrait.png");
        RgbImage::from_pixel(600, 300, image::Rgb([1, 2, 3]))
            .save(&path)
            .unwrap();

        let thumb = generate_jpeg_thumbnail(&path, 300, 85, Some(6)).unwrap();
        assert_eq!((thumb.width, thumb.height), (150, 300));
    }
}
