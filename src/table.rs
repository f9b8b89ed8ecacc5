//! The fixed twelve-column view over [`ImageRecord`]s.

use crate::models::ImageRecord;
use clap::ValueEnum;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Column {
    Filename,
    Dimensions,
    Resolution,
    ColorDepth,
    Compression,
    Format,
    AdditionalInfo,
    FileSize,
    Hash,
    Created,
    Modified,
    Accessed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Filename,
        Column::Dimensions,
        Column::Resolution,
        Column::ColorDepth,
        Column::Compression,
        Column::Format,
        Column::AdditionalInfo,
        Column::FileSize,
        Column::Hash,
        Column::Created,
        Column::Modified,
        Column::Accessed,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Filename => "Filename",
            Column::Dimensions => "Dimensions",
            Column::Resolution => "Resolution",
            Column::ColorDepth => "Color Depth",
            Column::Compression => "Compression",
            Column::Format => "Format",
            Column::AdditionalInfo => "Additional Info",
            Column::FileSize => "File Size (MB)",
            Column::Hash => "Hash",
            Column::Created => "Creation Time",
            Column::Modified => "Modification Time",
            Column::Accessed => "Last Access Time",
        }
    }

    pub fn cell(self, record: &ImageRecord) -> String {
        match self {
            Column::Filename => record.filename.clone(),
            Column::Dimensions => record.dimensions.to_string(),
            Column::Resolution => record.resolution.to_string(),
            Column::ColorDepth => record.color_depth.to_string(),
            Column::Compression => record.compression.clone(),
            Column::Format => record.format.clone(),
            Column::AdditionalInfo => record.additional_info.to_string(),
            Column::FileSize => format!("{:.2}", record.file_size_mb),
            Column::Hash => record.content_hash.clone(),
            Column::Created => record.created_at.clone(),
            Column::Modified => record.modified_at.clone(),
            Column::Accessed => record.accessed_at.clone(),
        }
    }

    /// Numeric columns order by value, the rest by their text.
    pub fn compare(self, a: &ImageRecord, b: &ImageRecord) -> Ordering {
        match self {
            Column::Dimensions => a
                .dimensions
                .pixel_count()
                .cmp(&b.dimensions.pixel_count())
                .then(a.dimensions.width.cmp(&b.dimensions.width)),
            Column::Resolution => a
                .resolution
                .x_dpi
                .total_cmp(&b.resolution.x_dpi)
                .then(a.resolution.y_dpi.total_cmp(&b.resolution.y_dpi)),
            Column::FileSize => a.file_size_mb.total_cmp(&b.file_size_mb),
            _ => self.cell(a).cmp(&self.cell(b)),
        }
    }
}

/// Plain-text report for one record: every column as `Header: Value`.
pub fn analysis_report(record: &ImageRecord) -> String {
    let mut report = String::from("File Analysis Report:\n\n");
    for column in Column::ALL {
        report.push_str(&format!("{}: {}\n", column.header(), column.cell(record)));
    }
    report
}

/// Render rows as an aligned text table, prefixed with the row index.
pub fn render_text(rows: &[ImageRecord]) -> String {
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    let mut header = vec!["#".to_string()];
    header.extend(Column::ALL.iter().map(|c| c.header().to_string()));
    cells.push(header);

    for (index, record) in rows.iter().enumerate() {
        let mut line = vec![index.to_string()];
        line.extend(Column::ALL.iter().map(|c| c.cell(record)));
        cells.push(line);
    }

    let widths: Vec<usize> = (0..cells[0].len())
        .map(|i| {
            cells
                .iter()
                .map(|line| line[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (n, line) in cells.iter().enumerate() {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');

        if n == 0 {
            let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
            out.push_str(&rule.join("  "));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdditionalInfo, ColorCount, ColorDepth, Dimensions, Resolution};
    use std::path::PathBuf;

    fn record(name: &str, width: u32, height: u32, size_mb: f64) -> ImageRecord {
        ImageRecord {
            filename: name.to_string(),
            dimensions: Dimensions { width, height },
            resolution: Resolution::DEFAULT,
            color_depth: ColorDepth::Bits24,
            compression: "No info".to_string(),
            format: "PNG".to_string(),
            additional_info: AdditionalInfo::Colors(ColorCount::Exact(3)),
            file_size_mb: size_mb,
            content_hash: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            created_at: "2024-01-02 03:04:05".to_string(),
            modified_at: "2024-01-02 03:04:06".to_string(),
            accessed_at: "2024-01-02 03:04:07".to_string(),
            source_path: PathBuf::from(format!("/images/{}", name)),
        }
    }

    #[test]
    fn test_headers_in_fixed_order() {
        let headers: Vec<_> = Column::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(
            headers,
            vec![
                "Filename",
                "Dimensions",
                "Resolution",
                "Color Depth",
                "Compression",
                "Format",
                "Additional Info",
                "File Size (MB)",
                "Hash",
                "Creation Time",
                "Modification Time",
                "Last Access Time",
            ]
        );
    }

    #[test]
    fn test_report_lists_every_column() {
        let report = analysis_report(&record("cat.png", 800, 600, 2.0));

        assert!(report.starts_with("File Analysis Report:\n\n"));
        assert_eq!(report.lines().count(), 2 + 12);
        assert!(report.contains("Filename: cat.png\n"));
        assert!(report.contains("Dimensions: 800x600\n"));
        assert!(report.contains("Resolution: 72x72 dpi\n"));
        assert!(report.contains("File Size (MB): 2.00\n"));
        assert!(report.contains("Additional Info: Colors: 3\n"));
        assert!(report.contains("Last Access Time: 2024-01-02 03:04:07\n"));
    }

    #[test]
    fn test_numeric_columns_compare_by_value() {
        let small = record("b.png", 10, 10, 9.5);
        let large = record("a.png", 100, 2, 10.25);

        assert_eq!(Column::FileSize.compare(&small, &large), Ordering::Less);
        assert_eq!(Column::Dimensions.compare(&small, &large), Ordering::Less);
        assert_eq!(Column::Filename.compare(&small, &large), Ordering::Greater);
    }

    #[test]
    fn test_render_text_aligns_columns() {
        let rows = vec![record("a.png", 1, 1, 0.01), record("longer-name.png", 2, 2, 0.02)];
        let text = render_text(&rows);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("#  Filename"));
        assert!(lines[1].starts_with("-  ---------------"));
        let hash_at = lines[0].find("Hash").unwrap();
        assert_eq!(&lines[2][hash_at..hash_at + 4], "d41d");
        assert_eq!(&lines[3][hash_at..hash_at + 4], "d41d");
    }
}
