use crate::core::preview::DEFAULT_PREVIEW_BOUNDS;
use crate::core::scanner::DEFAULT_EXTENSIONS;
use crate::theme::ThemeName;
use serde::{Deserialize, Serialize};

/// In-memory settings for one session. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    /// Side of the square box previews are fitted into.
    pub preview_bounds: u32,
    pub theme: ThemeName,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            preview_bounds: DEFAULT_PREVIEW_BOUNDS,
            theme: ThemeName::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(
            config.extensions,
            vec!["jpg", "jpeg", "png", "gif", "bmp", "tiff", "pcx"]
        );
        assert_eq!(config.preview_bounds, 300);
        assert_eq!(config.theme, ThemeName::Cyberpunk);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AnalyzerConfig = serde_json::from_str(r#"{"theme":"Retro"}"#).unwrap();
        assert_eq!(config.theme, ThemeName::Retro);
        assert_eq!(config.preview_bounds, 300);
    }
}
