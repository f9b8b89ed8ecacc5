use crate::core::color::{count_distinct_colors, PixelMode};
use crate::core::exif::{ExifService, ExifSummary};
use crate::core::hash::HashService;
use crate::core::header;
use crate::models::{AdditionalInfo, ColorCount, Dimensions, ImageRecord};
use chrono::{DateTime, Local};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const NO_COMPRESSION_INFO: &str = "No info";
const PNG_COLOR_CAP: usize = 256;

#[derive(Debug, Error)]
pub enum ExtractionCause {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unrecognized image format")]
    UnknownFormat,

    #[error("Image decoding error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decoder panicked")]
    Panicked,
}

/// A file that could not be turned into an [`ImageRecord`].
#[derive(Debug, Error)]
#[error("failed to analyze {}: {cause}", .path.display())]
pub struct ExtractionFailure {
    pub path: PathBuf,
    #[source]
    pub cause: ExtractionCause,
}

/// Format-specific rule for the "Additional Info" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoRule {
    ExifFieldCount,
    PaletteColors,
    CappedColors,
    Nothing,
}

impl InfoRule {
    fn for_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => InfoRule::ExifFieldCount,
            ImageFormat::Gif => InfoRule::PaletteColors,
            ImageFormat::Png => InfoRule::CappedColors,
            _ => InfoRule::Nothing,
        }
    }

    fn apply(self, img: &DynamicImage, exif: Option<&ExifSummary>) -> AdditionalInfo {
        match self {
            InfoRule::ExifFieldCount => match exif {
                Some(summary) => AdditionalInfo::Exif {
                    fields: summary.primary_fields,
                },
                None => AdditionalInfo::NoExif,
            },
            InfoRule::PaletteColors => match count_distinct_colors(img, None) {
                ColorCount::Exact(n) | ColorCount::MoreThan(n) => AdditionalInfo::PaletteColors(n),
            },
            InfoRule::CappedColors => {
                AdditionalInfo::Colors(count_distinct_colors(img, Some(PNG_COLOR_CAP)))
            }
            InfoRule::Nothing => AdditionalInfo::None,
        }
    }
}

/// Extracts one [`ImageRecord`] per readable image file. Stateless apart
/// from its helper services; safe to share across threads.
pub struct AnalyzerService {
    hash_service: HashService,
    exif_service: ExifService,
}

impl AnalyzerService {
    pub fn new() -> Self {
        Self {
            hash_service: HashService::new(),
            exif_service: ExifService::new(),
        }
    }

    /// Analyze a single file.
    ///
    /// Fails only when the file cannot be read or decoded as an image.
    /// Missing or corrupt auxiliary metadata degrades the affected field.
    pub fn analyze(&self, path: &Path) -> Result<ImageRecord, ExtractionFailure> {
        // Decoders can panic on malformed input
        let result = match panic::catch_unwind(AssertUnwindSafe(|| self.extract(path))) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Analysis of {} panicked: {:?}", path.display(), e);
                Err(ExtractionCause::Panicked)
            }
        };
        result.map_err(|cause| ExtractionFailure {
            path: path.to_path_buf(),
            cause,
        })
    }

    fn extract(&self, path: &Path) -> Result<ImageRecord, ExtractionCause> {
        let data = fs::read(path)?;

        let reader = ImageReader::new(Cursor::new(data.as_slice())).with_guessed_format()?;
        let format = reader.format().ok_or(ExtractionCause::UnknownFormat)?;
        let img = reader.decode()?;

        let exif = self.read_exif(path, format, &data);

        let mode = header::pixel_mode_hint(format, &data)
            .unwrap_or_else(|| PixelMode::from_color_type(img.color()));

        let resolution = header::resolution(format, &data)
            .or_else(|| exif.as_ref().and_then(|summary| summary.resolution))
            .unwrap_or_default();

        let compression = header::compression_hint(format, &data)
            .or_else(|| match format {
                ImageFormat::Tiff => exif.as_ref().and_then(|summary| summary.compression.clone()),
                _ => None,
            })
            .unwrap_or_else(|| NO_COMPRESSION_INFO.to_string());

        let additional_info = InfoRule::for_format(format).apply(&img, exif.as_ref());

        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        let created = metadata.created().unwrap_or(modified);
        let accessed = metadata.accessed().unwrap_or(modified);

        Ok(ImageRecord {
            filename: file_name(path),
            dimensions: Dimensions {
                width: img.width(),
                height: img.height(),
            },
            resolution,
            color_depth: mode.color_depth(),
            compression,
            format: format_name(format),
            additional_info,
            file_size_mb: megabytes(metadata.len()),
            content_hash: self.hash_service.digest(&data),
            created_at: format_timestamp(created),
            modified_at: format_timestamp(modified),
            accessed_at: format_timestamp(accessed),
            source_path: path.to_path_buf(),
        })
    }

    fn read_exif(&self, path: &Path, format: ImageFormat, data: &[u8]) -> Option<ExifSummary> {
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Tiff) {
            return None;
        }
        match self.exif_service.extract(data) {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::debug!("No usable EXIF in {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl Default for AnalyzerService {
    fn default() -> Self {
        Self::new()
    }
}

/// File size in mebibytes, rounded to two decimals.
pub fn megabytes(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Ico => "ICO".to_string(),
        _ => format!("{:?}", format).to_uppercase(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
