use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{
    consts::*,
    error::{ConfigParseSnafu, ConfigReadSnafu, SegmentError},
};

/// Padding applied around each block before cropping, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropMargins {
    /// Added on the left and on the right.
    pub x_extend: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for CropMargins {
    fn default() -> Self {
        Self {
            x_extend: DEFAULT_X_EXTEND,
            top: DEFAULT_TOP_EXTEND,
            bottom: DEFAULT_BOTTOM_EXTEND,
        }
    }
}

/// Knobs of the layout segmenter.
///
/// ```
/// use paperseg_core::config::SegmenterConfigBuilder;
///
/// let config = SegmenterConfigBuilder::default()
///     .fix_size(true)
///     .fix_length(512_u32)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_width, 1200);
/// assert_eq!(config.fix_length, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
#[builder(default, setter(into))]
pub struct SegmenterConfig {
    /// Accepted for configuration compatibility; crops are not enhanced.
    pub image_enhance: bool,
    /// Larger crop dimension cap in max-width mode.
    pub max_width: u32,
    /// Enables fixed-height mode for non-figure crops.
    pub fix_size: bool,
    /// Target height in fixed-height mode.
    pub fix_length: u32,
    /// Gap in pixels between consecutive blocks that triggers a synthetic block.
    pub continuous_block_threshold: f32,
    /// Skip gap patching on the first page of a document.
    pub exempt_first_page: bool,
    /// Mean Text/List width ratio above which a page is single-column.
    pub column_ratio_threshold: f32,
    pub margins: CropMargins,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            image_enhance: false,
            max_width: DEFAULT_MAX_WIDTH,
            fix_size: false,
            fix_length: DEFAULT_FIX_LENGTH,
            continuous_block_threshold: DEFAULT_CONTINUOUS_BLOCK_THRESHOLD,
            exempt_first_page: true,
            column_ratio_threshold: DEFAULT_COLUMN_RATIO_THRESHOLD,
            margins: CropMargins::default(),
        }
    }
}

/// Layout model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model_path: PathBuf,
    /// Square model input edge.
    pub input_size: usize,
    pub proba_threshold: f32,
    pub iou_threshold: f32,
    pub intra_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            input_size: REQUIRED_INPUT_SIZE,
            proba_threshold: PROBA_THRESHOLD,
            iou_threshold: NMS_IOU_THRESHOLD,
            intra_threads: 4,
        }
    }
}

/// Top level configuration, usually read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rasterization resolution.
    pub dpi: u32,
    /// Save an image of every page with its detected boxes drawn on it.
    pub debug_overlay: bool,
    pub segmenter: SegmenterConfig,
    pub detector: DetectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            debug_overlay: false,
            segmenter: SegmenterConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str, path: &str) -> Result<Self, SegmentError> {
        toml::from_str(content).context(ConfigParseSnafu { path })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SegmentError> {
        let path = path.as_ref();
        let display = path.to_string_lossy();
        let content = std::fs::read_to_string(path).context(ConfigReadSnafu {
            path: display.clone(),
        })?;

        Self::from_toml(&content, &display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segmenter_config_default() {
        let config = SegmenterConfig::default();
        assert_eq!(config.max_width, 1200);
        assert_eq!(config.fix_length, 672);
        assert_eq!(config.continuous_block_threshold, 100.0);
        assert!(!config.fix_size);
        assert!(!config.image_enhance);
        assert!(config.exempt_first_page);
        assert_eq!(config.margins.x_extend, 35.0);
        assert_eq!(config.margins.top, 9.0);
        assert_eq!(config.margins.bottom, 7.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
dpi = 200

[segmenter]
fix_size = true

[segmenter.margins]
x_extend = 20.0

[detector]
model_path = "/opt/models/layout.onnx"
"#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.dpi, 200);
        assert!(config.segmenter.fix_size);
        assert_eq!(config.segmenter.fix_length, 672);
        assert_eq!(config.segmenter.margins.x_extend, 20.0);
        assert_eq!(config.segmenter.margins.top, 9.0);
        assert_eq!(
            config.detector.model_path,
            PathBuf::from("/opt/models/layout.onnx")
        );
        assert_eq!(config.detector.proba_threshold, 0.7);
    }

    #[test]
    fn test_invalid_toml_is_reported_with_path() {
        let err = Config::from_toml("dpi = \"high\"", "paper.toml").unwrap_err();
        assert!(matches!(err, SegmentError::ConfigParse { .. }));
        assert!(err.to_string().contains("paper.toml"));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SegmentError::ConfigRead { .. }));
    }
}
