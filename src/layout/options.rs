//! Layout heuristics and conversion options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunable thresholds for classification and region merging.
///
/// Real-world PDFs vary widely, so none of these are hard invariants.
/// Deserializes from JSON with every field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Size ratio over the page baseline that alone makes a heading
    pub heading_size_ratio: f32,

    /// Size ratio over the baseline that makes a bold block a heading
    pub bold_heading_size_ratio: f32,

    /// Bold stops signalling headings when more of the page than this is bold
    pub max_bold_rate: f32,

    /// Bold blocks longer than this (in characters) are never headings
    pub bold_heading_max_chars: usize,

    /// Sizes within this many points share a heading band
    pub band_tolerance: f32,

    /// Deepest heading level emitted
    pub max_heading_level: u8,

    /// Derive heading levels from `2.3`-style numbering instead of size bands
    pub numbered_heading_levels: bool,

    /// Text blocks more contained than this in a table or image are dropped
    pub containment_threshold: f32,

    /// Chart description used when no OCR text is available
    pub image_placeholder: String,
}

impl LayoutConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading level.
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level;
        self
    }

    /// Enable or disable numbering-based heading levels.
    pub fn with_numbered_heading_levels(mut self, enabled: bool) -> Self {
        self.numbered_heading_levels = enabled;
        self
    }

    /// Set the chart placeholder description.
    pub fn with_image_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.image_placeholder = placeholder.into();
        self
    }

    /// Parse a config from JSON, filling absent fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid layout config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.heading_size_ratio.is_finite() && self.heading_size_ratio > 1.0) {
            return Err(Error::Config(format!(
                "heading_size_ratio must be greater than 1.0, got {}",
                self.heading_size_ratio
            )));
        }
        if !(self.bold_heading_size_ratio.is_finite() && self.bold_heading_size_ratio > 0.0) {
            return Err(Error::Config(format!(
                "bold_heading_size_ratio must be positive, got {}",
                self.bold_heading_size_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.containment_threshold) {
            return Err(Error::Config(format!(
                "containment_threshold must lie in [0, 1], got {}",
                self.containment_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.max_bold_rate) {
            return Err(Error::Config(format!(
                "max_bold_rate must lie in [0, 1], got {}",
                self.max_bold_rate
            )));
        }
        if !(self.band_tolerance.is_finite() && self.band_tolerance >= 0.0) {
            return Err(Error::Config(format!(
                "band_tolerance must be non-negative, got {}",
                self.band_tolerance
            )));
        }
        if self.max_heading_level == 0 {
            return Err(Error::Config("max_heading_level must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            heading_size_ratio: 1.5,
            bold_heading_size_ratio: 1.15,
            max_bold_rate: 0.5,
            bold_heading_max_chars: 120,
            band_tolerance: 0.5,
            max_heading_level: 6,
            numbered_heading_levels: false,
            containment_threshold: 0.6,
            image_placeholder: "image detected".to_string(),
        }
    }
}

/// Options for a full conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Layout heuristics
    pub layout: LayoutConfig,

    /// Whether to analyze pages in parallel
    pub parallel: bool,

    /// Worker threads for the analysis pool (None = rayon default)
    pub worker_threads: Option<usize>,
}

impl ConvertOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout config.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Bound the analysis pool to `threads` workers.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            parallel: true,
            worker_threads: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.heading_size_ratio, 1.5);
        assert_eq!(config.bold_heading_size_ratio, 1.15);
        assert_eq!(config.containment_threshold, 0.6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = LayoutConfig::from_json(r#"{"heading_size_ratio": 1.8}"#).unwrap();
        assert_eq!(config.heading_size_ratio, 1.8);
        assert_eq!(config.max_heading_level, 6);
        assert_eq!(config.image_placeholder, "image detected");
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(LayoutConfig::from_json(r#"{"containment_threshold": 1.5}"#).is_err());
        assert!(LayoutConfig::new().with_max_heading_level(0).validate().is_err());
        assert!(LayoutConfig::from_json(r#"{"heading_size_ratio": 0.9}"#).is_err());
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new().sequential().with_worker_threads(2);
        assert!(!options.parallel);
        assert_eq!(options.worker_threads, Some(2));
    }
}
