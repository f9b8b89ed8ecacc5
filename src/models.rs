use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

// Image record: one per successfully analyzed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub filename: String,
    pub dimensions: Dimensions,
    pub resolution: Resolution,
    pub color_depth: ColorDepth,
    pub compression: String,
    pub format: String,
    pub additional_info: AdditionalInfo,
    pub file_size_mb: f64,
    pub content_hash: String,
    pub created_at: String,
    pub modified_at: String,
    pub accessed_at: String,
    pub source_path: PathBuf, // not displayed, used for preview lookup
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Horizontal and vertical resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolution {
    pub x_dpi: f64,
    pub y_dpi: f64,
}

impl Resolution {
    /// Resolution assumed when the file carries none.
    pub const DEFAULT: Resolution = Resolution {
        x_dpi: 72.0,
        y_dpi: 72.0,
    };

    pub fn new(x_dpi: f64, y_dpi: f64) -> Self {
        Self { x_dpi, y_dpi }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} dpi",
            trim_number(self.x_dpi),
            trim_number(self.y_dpi)
        )
    }
}

/// Rounds to two decimals; `72.0` prints as `72`, `72.009` as `72.01`.
fn trim_number(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorDepth {
    OneBit,
    Grayscale8,
    Bits24,
    Bits32,
    Unknown,
}

impl ColorDepth {
    pub fn label(&self) -> &'static str {
        match self {
            ColorDepth::OneBit => "1 bit (B&W)",
            ColorDepth::Grayscale8 => "8 bit (Grayscale)",
            ColorDepth::Bits24 => "24 bit",
            ColorDepth::Bits32 => "32 bit",
            ColorDepth::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ColorDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Number of distinct colours, possibly truncated at a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCount {
    Exact(usize),
    MoreThan(usize),
}

/// Format-specific summary shown in the "Additional Info" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalInfo {
    /// JPEG with a readable EXIF block; counts the primary IFD fields.
    Exif { fields: usize },
    /// JPEG whose EXIF block is missing or unreadable.
    NoExif,
    /// GIF distinct colour count.
    PaletteColors(usize),
    /// PNG distinct colour count, capped at 256.
    Colors(ColorCount),
    None,
}

impl fmt::Display for AdditionalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdditionalInfo::Exif { fields } => write!(f, "EXIF data: {} fields", fields),
            AdditionalInfo::NoExif => f.write_str("No EXIF data"),
            AdditionalInfo::PaletteColors(n) => write!(f, "Palette colors: {}", n),
            AdditionalInfo::Colors(ColorCount::Exact(n)) => write!(f, "Colors: {}", n),
            AdditionalInfo::Colors(ColorCount::MoreThan(n)) => write!(f, "Colors: More than {}", n),
            AdditionalInfo::None => Ok(()),
        }
    }
}

impl Serialize for AdditionalInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_display_trims_whole_numbers() {
        assert_eq!(Resolution::DEFAULT.to_string(), "72x72 dpi");
        assert_eq!(Resolution::new(72.009, 300.0).to_string(), "72.01x300 dpi");
    }

    #[test]
    fn test_additional_info_text() {
        assert_eq!(AdditionalInfo::Exif { fields: 11 }.to_string(), "EXIF data: 11 fields");
        assert_eq!(AdditionalInfo::NoExif.to_string(), "No EXIF data");
        assert_eq!(AdditionalInfo::PaletteColors(17).to_string(), "Palette colors: 17");
        assert_eq!(
            AdditionalInfo::Colors(ColorCount::Exact(4)).to_string(),
            "Colors: 4"
        );
        assert_eq!(
            AdditionalInfo::Colors(ColorCount::MoreThan(256)).to_string(),
            "Colors: More than 256"
        );
        assert_eq!(AdditionalInfo::None.to_string(), "");
    }

    #[test]
    fn test_record_serializes_display_strings() {
        let record = ImageRecord {
            filename: "a.png".to_string(),
            dimensions: Dimensions {
                width: 2,
                height: 3,
            },
            resolution: Resolution::DEFAULT,
            color_depth: ColorDepth::Bits24,
            compression: "No info".to_string(),
            format: "PNG".to_string(),
            additional_info: AdditionalInfo::Colors(ColorCount::Exact(1)),
            file_size_mb: 0.0,
            content_hash: "00".to_string(),
            created_at: String::new(),
            modified_at: String::new(),
            accessed_at: String::new(),
            source_path: PathBuf::from("/tmp/a.png"),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["color_depth"], "24 bit");
        assert_eq!(json["additional_info"], "Colors: 1");
        assert_eq!(json["dimensions"]["width"], 2);
    }
}
