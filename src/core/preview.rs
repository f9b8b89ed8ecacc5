use crate::models::ImageRecord;
use crate::table;
use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use std::path::Path;
use thiserror::Error;

/// Side of the square box previews are fitted into.
pub const DEFAULT_PREVIEW_BOUNDS: u32 = 300;

/// Shown in place of the image when it cannot be rendered.
pub const PREVIEW_PLACEHOLDER: &str = "Unable to load image";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone)]
pub enum PreviewImage {
    Rendered(DynamicImage),
    Unavailable(&'static str),
}

/// What the preview pane shows for one selected row.
#[derive(Debug, Clone)]
pub struct Preview {
    pub image: PreviewImage,
    pub report: String,
}

pub struct PreviewService {
    bounds: u32,
}

impl PreviewService {
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_PREVIEW_BOUNDS)
    }

    pub fn with_bounds(bounds: u32) -> Self {
        Self {
            bounds: bounds.max(1),
        }
    }

    /// Build the preview for a record. A failed render degrades to the
    /// placeholder; the textual report is always present.
    pub fn preview(&self, record: &ImageRecord) -> Preview {
        let image = match self.render(&record.source_path) {
            Ok(img) => PreviewImage::Rendered(img),
            Err(e) => {
                log::warn!(
                    "Error displaying image {}: {}",
                    record.source_path.display(),
                    e
                );
                PreviewImage::Unavailable(PREVIEW_PLACEHOLDER)
            }
        };

        Preview {
            image,
            report: table::analysis_report(record),
        }
    }

    /// Decode `path` and scale it to fit the bounding box, keeping the
    /// aspect ratio. Smaller images are scaled up to the box as well.
    pub fn render(&self, path: &Path) -> Result<DynamicImage, PreviewError> {
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        // Lanczos3 filter for smooth resampling
        Ok(img.resize(self.bounds, self.bounds, FilterType::Lanczos3))
    }

    pub fn save(&self, img: &DynamicImage, path: &Path) -> Result<(), PreviewError> {
        img.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl Default for PreviewService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::AnalyzerService;
    use image::{GenericImageView, ImageBuffer, Rgb};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_image(path: &Path, width: u32, height: u32) {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let intensity = ((x + y) % 256) as u8;
            Rgb([intensity, intensity, intensity])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn test_render_fits_landscape_in_box() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wide.png");
        create_test_image(&path, 800, 600);

        let img = PreviewService::new().render(&path).unwrap();
        assert_eq!(img.dimensions(), (300, 225));
    }

    #[test]
    fn test_render_fits_portrait_in_box() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tall.png");
        create_test_image(&path, 200, 400);

        let img = PreviewService::with_bounds(100).render(&path).unwrap();
        assert_eq!(img.dimensions(), (50, 100));
    }

    #[test]
    fn test_preview_falls_back_to_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.png");
        create_test_image(&path, 20, 20);
        let record = AnalyzerService::new().analyze(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let preview = PreviewService::new().preview(&record);
        assert!(matches!(
            preview.image,
            PreviewImage::Unavailable(PREVIEW_PLACEHOLDER)
        ));
        assert!(preview.report.contains("Filename: gone.png"));
    }

    #[test]
    fn test_save_writes_png() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.jpg");
        create_test_image(&source, 40, 20);

        let service = PreviewService::new();
        let img = service.render(&source).unwrap();
        let out = temp_dir.path().join("preview.png");
        service.save(&img, &out).unwrap();

        assert_eq!(image::image_dimensions(&out).unwrap(), (300, 150));
    }
}
