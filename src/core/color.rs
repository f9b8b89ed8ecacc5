use crate::models::{ColorCount, ColorDepth};
use image::{ColorType, DynamicImage};
use std::collections::HashSet;

/// Pixel layout of a decoded image, as the file itself declares it.
///
/// The imaging library widens bilevel and palette images to 8-bit gray or
/// RGB(A) on decode, so those two modes come from header hints rather than
/// from [`ColorType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Bilevel,
    Gray,
    Rgb,
    Rgba,
    Palette,
    Other,
}

impl PixelMode {
    pub fn from_color_type(color: ColorType) -> Self {
        match color {
            ColorType::L8 => PixelMode::Gray,
            ColorType::Rgb8 | ColorType::Rgb16 => PixelMode::Rgb,
            ColorType::Rgba8 | ColorType::Rgba16 => PixelMode::Rgba,
            _ => PixelMode::Other,
        }
    }

    /// Fixed lookup; anything outside the four known modes is `Unknown`.
    pub fn color_depth(self) -> ColorDepth {
        match self {
            PixelMode::Bilevel => ColorDepth::OneBit,
            PixelMode::Gray => ColorDepth::Grayscale8,
            PixelMode::Rgb => ColorDepth::Bits24,
            PixelMode::Rgba => ColorDepth::Bits32,
            PixelMode::Palette | PixelMode::Other => ColorDepth::Unknown,
        }
    }
}

/// Count distinct pixel values in the image's native layout.
///
/// With `cap = Some(n)` counting stops once more than `n` colours are seen.
pub fn count_distinct_colors(img: &DynamicImage, cap: Option<usize>) -> ColorCount {
    let bytes_per_pixel = img.color().bytes_per_pixel() as usize;
    let mut seen: HashSet<&[u8]> = HashSet::new();

    for pixel in img.as_bytes().chunks_exact(bytes_per_pixel) {
        seen.insert(pixel);
        if let Some(limit) = cap {
            if seen.len() > limit {
                return ColorCount::MoreThan(limit);
            }
        }
    }

    ColorCount::Exact(seen.len())
}
