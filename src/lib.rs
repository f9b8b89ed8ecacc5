//! Image metadata extraction: per-file records, background batch runs and
//! the table/preview state a front end renders.

pub mod config;
pub mod core;
pub mod models;
pub mod session;
pub mod table;
pub mod theme;

pub use config::AnalyzerConfig;
pub use models::ImageRecord;
pub use session::AnalyzerSession;
