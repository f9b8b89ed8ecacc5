//! Probes over raw container bytes for the details the decoder discards:
//! declared resolution, palette/bilevel pixel layouts and compression.
//!
//! Every probe returns `None` on truncated or unexpected input; callers fall
//! back to a default instead of failing the record.

use crate::core::color::PixelMode;
use crate::models::Resolution;
use image::ImageFormat;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const INCHES_PER_METRE: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

/// Resolution declared in the container header, if any.
pub fn resolution(format: ImageFormat, data: &[u8]) -> Option<Resolution> {
    match format {
        ImageFormat::Jpeg => jfif_density(data),
        ImageFormat::Png => png_physical_size(data),
        ImageFormat::Bmp => bmp_info(data).and_then(|info| info.resolution),
        _ => None,
    }
}

/// Pixel layouts the decoder widens away (palette, bilevel).
pub fn pixel_mode_hint(format: ImageFormat, data: &[u8]) -> Option<PixelMode> {
    match format {
        ImageFormat::Gif => Some(PixelMode::Palette),
        ImageFormat::Png => {
            let (bit_depth, color_type) = png_ihdr(data)?;
            match (color_type, bit_depth) {
                (3, _) => Some(PixelMode::Palette),
                (0, 1) => Some(PixelMode::Bilevel),
                _ => None,
            }
        }
        ImageFormat::Bmp => bmp_info(data)?.palette_mode,
        _ => None,
    }
}

/// Compression named in the container header. TIFF is handled by the
/// EXIF reader since its compression lives in an IFD tag.
pub fn compression_hint(format: ImageFormat, data: &[u8]) -> Option<String> {
    match format {
        ImageFormat::Bmp => bmp_info(data)
            .and_then(|info| info.compression)
            .map(|c| bmp_compression_name(c).to_string()),
        _ => None,
    }
}

// --- JPEG ---

fn jfif_density(data: &[u8]) -> Option<Resolution> {
    if data.get(0..2)? != [0xFF, 0xD8] {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Density must precede the first scan
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }

        let length = be_u16(data, pos + 2)? as usize;
        if length < 2 {
            return None;
        }
        let payload = data.get(pos + 4..pos + 2 + length)?;

        if marker == 0xE0 && payload.len() >= 12 && &payload[0..5] == b"JFIF\0" {
            let unit = payload[7];
            let x = u16::from_be_bytes([payload[8], payload[9]]) as f64;
            let y = u16::from_be_bytes([payload[10], payload[11]]) as f64;
            if x == 0.0 || y == 0.0 {
                return None;
            }
            return match unit {
                1 => Some(Resolution::new(x, y)),
                2 => Some(Resolution::new(x * CM_PER_INCH, y * CM_PER_INCH)),
                // Unit 0 is an aspect ratio only
                _ => None,
            };
        }

        pos += 2 + length;
    }
    None
}

// --- PNG ---

fn png_ihdr(data: &[u8]) -> Option<(u8, u8)> {
    if data.get(0..8)? != PNG_SIGNATURE || data.get(12..16)? != b"IHDR" {
        return None;
    }
    Some((*data.get(24)?, *data.get(25)?))
}

fn png_physical_size(data: &[u8]) -> Option<Resolution> {
    if data.get(0..8)? != PNG_SIGNATURE {
        return None;
    }

    let mut pos = 8;
    while pos + 8 <= data.len() {
        let chunk_len = be_u32(data, pos)? as usize;
        let chunk_type = &data[pos + 4..pos + 8];

        match chunk_type {
            b"pHYs" if chunk_len >= 9 => {
                let x = be_u32(data, pos + 8)?;
                let y = be_u32(data, pos + 12)?;
                let unit = *data.get(pos + 16)?;
                // Unit 0 only states the pixel aspect ratio
                if unit != 1 || x == 0 || y == 0 {
                    return None;
                }
                return Some(Resolution::new(
                    x as f64 * INCHES_PER_METRE,
                    y as f64 * INCHES_PER_METRE,
                ));
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }

        pos += 12 + chunk_len; // length + type + data + crc
    }
    None
}

// --- BMP ---

struct BmpInfo {
    /// Set for indexed bitmaps whose colour table could be read.
    palette_mode: Option<PixelMode>,
    compression: Option<u32>,
    resolution: Option<Resolution>,
}

fn bmp_info(data: &[u8]) -> Option<BmpInfo> {
    if data.get(0..2)? != b"BM" {
        return None;
    }
    let dib_size = le_u32(data, 14)?;

    let table_start = 14 + dib_size as usize;

    // OS/2 core header: 16-bit fields, 3-byte table entries, no compression
    // or resolution
    if dib_size == 12 {
        let bit_count = le_u16(data, 24)?;
        return Some(BmpInfo {
            palette_mode: bmp_palette_mode(data, table_start, 3, bit_count, 0),
            compression: None,
            resolution: None,
        });
    }
    if dib_size < 40 {
        return None;
    }

    let x_ppm = le_u32(data, 38)?;
    let y_ppm = le_u32(data, 42)?;
    let resolution = (x_ppm > 0 && y_ppm > 0).then(|| {
        Resolution::new(
            x_ppm as f64 * INCHES_PER_METRE,
            y_ppm as f64 * INCHES_PER_METRE,
        )
    });

    let bit_count = le_u16(data, 28)?;
    let colors_used = le_u32(data, 46)?;

    Some(BmpInfo {
        palette_mode: bmp_palette_mode(data, table_start, 4, bit_count, colors_used),
        compression: Some(le_u32(data, 30)?),
        resolution,
    })
}

/// Classify an indexed bitmap by its colour table. A table that is the
/// identity grey ramp is plain greyscale; a black/white pair is bilevel.
fn bmp_palette_mode(
    data: &[u8],
    table_start: usize,
    entry_size: usize,
    bit_count: u16,
    colors_used: u32,
) -> Option<PixelMode> {
    if !(1..=8).contains(&bit_count) {
        return None;
    }
    let colors = match colors_used {
        0 => 1usize << bit_count,
        n => n as usize,
    };
    if colors > 256 {
        return Some(PixelMode::Palette);
    }

    let table = data.get(table_start..table_start + colors * entry_size)?;
    let greyscale = table.chunks_exact(entry_size).enumerate().all(|(i, entry)| {
        let level = match colors {
            2 => [0u8, 255][i],
            _ => i as u8,
        };
        entry[..3] == [level; 3]
    });

    Some(match (greyscale, colors) {
        (true, 2) => PixelMode::Bilevel,
        (true, _) => PixelMode::Gray,
        (false, _) => PixelMode::Palette,
    })
}

fn bmp_compression_name(code: u32) -> &'static str {
    match code {
        0 => "BI_RGB (uncompressed)",
        1 => "BI_RLE8",
        2 => "BI_RLE4",
        3 => "BI_BITFIELDS",
        4 => "BI_JPEG",
        5 => "BI_PNG",
        6 => "BI_ALPHABITFIELDS",
        _ => "Unknown",
    }
}

// --- Helpers ---

fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn le_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
