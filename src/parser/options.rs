//! Extraction options.

use super::table_detector::TableDetectorConfig;

/// Options for the PDF extraction front-end.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode for per-page extractor failures
    pub error_mode: ErrorMode,

    /// Whether to run table detection
    pub extract_tables: bool,

    /// Whether to report image regions
    pub extract_images: bool,

    /// Table detector thresholds
    pub table_detector: TableDetectorConfig,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient mode (skip failing extractors).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, extract: bool) -> Self {
        self.extract_tables = extract;
        self
    }

    /// Enable or disable image regions.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            extract_tables: true,
            extract_images: true,
            table_detector: TableDetectorConfig::default(),
        }
    }
}

/// What to do when one extractor fails on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the whole document
    #[default]
    Strict,
    /// Log a warning and treat the stream as empty for that page
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new().lenient().with_tables(false);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(!options.extract_tables);
        assert!(options.extract_images);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.extract_tables);
    }
}
