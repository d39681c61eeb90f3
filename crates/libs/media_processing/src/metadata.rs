use color_eyre::eyre::Result;
use exif::{In, Reader, Tag};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Dimensions and EXIF tags of an image on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Tag name to human-readable value. Empty when the file carries no EXIF.
    pub exif: BTreeMap<String, String>,
    /// EXIF orientation (1-8), when present.
    pub orientation: Option<u32>,
}

/// Reads the pixel dimensions of an image and, best effort, its EXIF tags.
///
/// # Errors
///
/// Returns an error if the dimensions cannot be determined. Missing or
/// malformed EXIF data is not an error.
pub fn read_image_metadata(path: &Path) -> Result<ImageMetadata> {
    let size = imagesize::size(path)?;
    let (exif, orientation) = match read_exif(path) {
        Ok(found) => found,
        Err(e) => {
            debug!("No EXIF data for {}: {e}", path.display());
            (BTreeMap::new(), None)
        }
    };

    Ok(ImageMetadata {
        width: size.width as u32,
        height: size.height as u32,
        exif,
        orientation,
    })
}

fn read_exif(path: &Path) -> Result<(BTreeMap<String, String>, Option<u32>)> {
    let mut reader = BufReader::new(File::open(path)?);
    let exif = Reader::new().read_from_container(&mut reader)?;

    let mut tags = BTreeMap::new();
    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let value = field.display_value().with_unit(&exif).to_string();
        tags.insert(field.tag.to_string(), value);
    }
    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0));

    Ok((tags, orientation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn reads_dimensions_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::from_pixel(64, 32, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let meta = read_image_metadata(&path).unwrap();
        assert_eq!((meta.width, meta.height), (64, 32));
        assert!(meta.exif.is_empty());
        assert_eq!(meta.orientation, None);
    }

    #[test]
    fn rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"just some text").unwrap();

        assert!(read_image_metadata(&path).is_err());
    }
}
