use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions accepted when selecting a folder or a set of files.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "pcx"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Turns a folder or an explicit selection into the ordered path list a
/// batch runs over.
pub struct ScannerService {
    supported_formats: HashSet<String>,
}

impl ScannerService {
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS.iter().copied())
    }

    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let supported_formats = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        Self { supported_formats }
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.supported_formats.contains(&ext))
    }

    /// Files directly inside `dir` (no recursion) with a supported
    /// extension, sorted by file name.
    pub fn list_directory(&self, dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::InvalidPath {
                path: format!("{} is not a directory", dir.display()),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }

        log::debug!("Found {} image(s) in {}", files.len(), dir.display());
        Ok(files)
    }

    /// Keep the explicitly selected files with a supported extension, in
    /// selection order, dropping repeats.
    pub fn filter_selection(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        paths
            .iter()
            .filter(|path| self.is_supported(path))
            .filter(|path| seen.insert((*path).clone()))
            .cloned()
            .collect()
    }
}

impl Default for ScannerService {
    fn default() -> Self {
        Self::new()
    }
}
