use image::{ImageBuffer, Rgb};
use picmeta::core::{BatchRunner, ScannerService};
use picmeta::models::{AdditionalInfo, ColorCount, Dimensions, ImageRecord};
use picmeta::session::SessionUpdate;
use picmeta::{AnalyzerConfig, AnalyzerSession};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PALETTE: [[u8; 3]; 6] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [0, 255, 255],
    [20, 20, 20],
];

fn create_banded_png(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb(PALETTE[((x / 50 + y / 100) % PALETTE.len() as u32) as usize])
    });
    img.save(path).unwrap();
}

/// Pad a JPEG to `target` bytes with comment segments right after SOI.
fn pad_jpeg(encoded: &[u8], target: usize) -> Vec<u8> {
    let mut remaining = target - encoded.len();
    let mut padded = encoded[..2].to_vec();
    while remaining > 0 {
        let mut segment = remaining.min(4 + 65533);
        // Every segment needs at least its 4-byte header
        if (1..4).contains(&(remaining - segment)) {
            segment -= 4;
        }
        let body = segment - 4;
        padded.extend_from_slice(&[0xFF, 0xFE]);
        padded.extend_from_slice(&((body + 2) as u16).to_be_bytes());
        padded.extend(std::iter::repeat(b'.').take(body));
        remaining -= segment;
    }
    padded.extend_from_slice(&encoded[2..]);
    padded
}

#[test]
fn test_directory_with_png_and_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    create_banded_png(&temp_dir.path().join("bands.png"), 800, 600);
    fs::write(temp_dir.path().join("corrupt.png"), b"\x89PNG\r\n\x1a\ngarbage").unwrap();

    let paths = ScannerService::new()
        .list_directory(temp_dir.path())
        .unwrap();
    assert_eq!(paths.len(), 2);

    let mut records: Vec<ImageRecord> = Vec::new();
    let mut progress = Vec::new();
    let report = BatchRunner::new().run_with(&paths, |p| progress.push(p), |r| records.push(r));

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.filename, "bands.png");
    assert_eq!(record.dimensions, Dimensions { width: 800, height: 600 });
    assert_eq!(
        record.additional_info,
        AdditionalInfo::Colors(ColorCount::Exact(PALETTE.len()))
    );
    assert_eq!(record.additional_info.to_string(), "Colors: 6");

    assert_eq!(progress, vec![50, 100]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("corrupt.png"));
}

#[test]
fn test_four_mib_jpeg_without_exif() {
    let temp_dir = TempDir::new().unwrap();
    let small = temp_dir.path().join("small.jpg");
    ImageBuffer::from_fn(64, 48, |x, y| Rgb([x as u8, y as u8, 128]))
        .save(&small)
        .unwrap();

    let encoded = fs::read(&small).unwrap();
    let padded = pad_jpeg(&encoded, 4 * 1024 * 1024);
    assert_eq!(padded.len(), 4_194_304);
    let path = temp_dir.path().join("big.jpg");
    fs::write(&path, &padded).unwrap();

    let mut records = Vec::new();
    BatchRunner::new().run_with(&[path], |_| {}, |r| records.push(r));

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].format, "JPEG");
    assert_eq!(records[0].dimensions, Dimensions { width: 64, height: 48 });
    assert_eq!(records[0].additional_info.to_string(), "No EXIF data");
    assert_eq!(records[0].file_size_mb, 4.0);
}

#[test]
fn test_identical_bytes_share_a_hash() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a.png");
    let b = temp_dir.path().join("b.png");
    create_banded_png(&a, 100, 100);
    fs::copy(&a, &b).unwrap();

    let c = temp_dir.path().join("c.png");
    create_banded_png(&c, 100, 101);

    let mut hashes = Vec::new();
    BatchRunner::new().run_with(&[a, b, c], |_| {}, |r| hashes.push(r.content_hash));

    assert_eq!(hashes.len(), 3);
    assert_eq!(hashes[0], hashes[1]);
    assert_ne!(hashes[0], hashes[2]);
}

#[tokio::test]
async fn test_session_surfaces_skipped_files() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("good.png");
    let bad = temp_dir.path().join("bad.gif");
    create_banded_png(&good, 60, 40);
    fs::write(&bad, b"GIF89a").unwrap();

    let mut session = AnalyzerSession::new(AnalyzerConfig::default());
    session.start_batch(vec![bad.clone(), good]);

    let mut updates = Vec::new();
    while let Some(update) = session.next_update().await {
        updates.push(update);
    }

    assert!(matches!(&updates[0], SessionUpdate::Skipped(item) if item.path == bad));
    assert_eq!(updates[1], SessionUpdate::Progress(50));
    assert_eq!(updates[2], SessionUpdate::RowInserted(0));
    assert_eq!(updates[3], SessionUpdate::Progress(100));
    assert!(matches!(updates[4], SessionUpdate::Finished(_)));
    assert_eq!(session.rows().len(), 1);
}
