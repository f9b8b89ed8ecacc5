use crate::models::Resolution;
use exif::{Context, Exif, In, Reader, Tag, Value};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExifError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("EXIF parsing error: {0}")]
    Parse(#[from] exif::Error),
}

/// What the analyzer needs out of an EXIF/TIFF directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ExifSummary {
    /// Fields of the primary image directory (IFD0), sub-IFDs excluded.
    pub primary_fields: usize,
    pub resolution: Option<Resolution>,
    pub compression: Option<String>,
}

/// Service for reading descriptive metadata blocks from image containers
pub struct ExifService;

impl ExifService {
    pub fn new() -> Self {
        Self
    }

    /// Parse the EXIF block of a JPEG (APP1) or the directory of a TIFF file.
    pub fn extract(&self, data: &[u8]) -> Result<ExifSummary, ExifError> {
        let mut cursor = Cursor::new(data);
        let exif = Reader::new().read_from_container(&mut cursor)?;

        Ok(ExifSummary {
            primary_fields: self.primary_field_count(&exif),
            resolution: self.resolution(&exif),
            compression: exif
                .get_field(Tag::Compression, In::PRIMARY)
                .map(|field| field.display_value().to_string()),
        })
    }

    /// Entries of IFD0. The reader resolves the Exif and GPS pointer entries
    /// into their sub-IFDs instead of listing them, so each pointer is counted
    /// back in when its sub-IFD has fields.
    fn primary_field_count(&self, exif: &Exif) -> usize {
        let mut tiff_fields = 0;
        let mut has_exif_ifd = false;
        let mut has_gps_ifd = false;

        for field in exif.fields().filter(|field| field.ifd_num == In::PRIMARY) {
            let context = field.tag.context();
            if context == Context::Tiff {
                tiff_fields += 1;
            } else if context == Context::Exif || context == Context::Interop {
                // Interop is only reachable through the Exif IFD
                has_exif_ifd = true;
            } else if context == Context::Gps {
                has_gps_ifd = true;
            }
        }

        tiff_fields + usize::from(has_exif_ifd) + usize::from(has_gps_ifd)
    }

    /// X/YResolution scaled by ResolutionUnit (2 = inch, 3 = centimetre).
    fn resolution(&self, exif: &Exif) -> Option<Resolution> {
        let x = self.field_to_f64(exif, Tag::XResolution)?;
        let y = self.field_to_f64(exif, Tag::YResolution)?;
        let unit = exif
            .get_field(Tag::ResolutionUnit, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(2);

        match unit {
            2 => Some(Resolution::new(x, y)),
            3 => Some(Resolution::new(x * 2.54, y * 2.54)),
            _ => None,
        }
    }

    fn field_to_f64(&self, exif: &Exif, tag: Tag) -> Option<f64> {
        let field = exif.get_field(tag, In::PRIMARY)?;
        let value = match &field.value {
            Value::Rational(vec) => vec.first().map(|r| r.to_f64()),
            Value::Short(vec) => vec.first().map(|&v| v as f64),
            Value::Long(vec) => vec.first().map(|&v| v as f64),
            _ => None,
        }?;
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

impl Default for ExifService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_from_non_image_fails() {
        let exif_service = ExifService::new();
        let result = exif_service.extract(b"This is not an image file");
        assert!(result.is_err());
    }

    #[test]
    fn test_jpeg_without_exif_block_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.jpg");
        ImageBuffer::from_pixel(8, 8, Rgb([200u8, 10, 10]))
            .save(&path)
            .unwrap();

        let data = fs::read(&path).unwrap();
        assert!(ExifService::new().extract(&data).is_err());
    }

    #[test]
    fn test_tiff_directory_is_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.tiff");
        ImageBuffer::from_pixel(8, 8, Rgb([1u8, 2, 3]))
            .save(&path)
            .unwrap();

        let data = fs::read(&path).unwrap();
        let summary = ExifService::new().extract(&data).unwrap();
        assert!(summary.primary_fields > 0);
        assert!(summary.compression.is_some());
    }
}
