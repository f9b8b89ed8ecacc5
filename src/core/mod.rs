pub mod analyzer;
pub mod batch;
pub mod color;
pub mod exif;
pub mod hash;
pub mod header;
pub mod preview;
pub mod scanner;

pub use analyzer::{AnalyzerService, ExtractionCause, ExtractionFailure};
pub use batch::{BatchObserver, BatchReport, BatchRunner};
pub use preview::PreviewService;
pub use scanner::ScannerService;
