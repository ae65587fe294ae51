use crate::analysis::labels::Label;

/// The number of values representing bounding box coordinates in YOLO format.
///
/// YOLO format uses 4 values: [center_x, center_y, width, height]
/// This constant defines the offset where class probability data begins
/// in the model output tensor.
pub const CXYWH_OFFSET: usize = 4;

/// The number of PubLayNet classes the layout model can detect.
pub const LABEL_SIZE: usize = Label::label_size();

/// The total size of each detection vector in the model output.
pub const LABEL_PROBA_SIZE: usize = CXYWH_OFFSET + LABEL_SIZE;

/// Minimum confidence for accepting a detection.
///
/// Matches the score threshold the PubLayNet layout model is usually run with.
pub const PROBA_THRESHOLD: f32 = 0.7;

/// Overlap ratio above which two detections are merged during NMS.
pub const NMS_IOU_THRESHOLD: f32 = 0.45;

/// Square input edge of the layout model.
pub const REQUIRED_INPUT_SIZE: usize = 1024;

/// Number of color channels in the input image.
pub const INPUT_CHANNELS: usize = 3;

/// Batch size for model inference.
pub const BATCH_SIZE: usize = 1;

/// Background fill value for letterboxed areas (144/255, neutral gray).
pub const BACKGROUND_FILL_VALUE: f32 = 144.0 / 255.0;

/// YOLO heads down-sample the input by these strides.
pub const YOLO_STRIDES: [usize; 3] = [8, 16, 32];

pub const DEFAULT_MODEL_PATH: &str = "models/publaynet-yolo.onnx";

pub const PDFIUM_LIB_PATH_ENV_NAME: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// PDF user space is 72 points per inch.
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

pub const DEFAULT_DPI: u32 = 300;

pub const DEFAULT_MAX_WIDTH: u32 = 1200;

pub const DEFAULT_FIX_LENGTH: u32 = 672;

/// Vertical distance in pixels between consecutive blocks above which a
/// missed region is assumed.
pub const DEFAULT_CONTINUOUS_BLOCK_THRESHOLD: f32 = 100.0;

/// Mean Text/List width ratio above which a page is single-column.
pub const DEFAULT_COLUMN_RATIO_THRESHOLD: f32 = 0.5;

/// Horizontal padding added on both sides of each crop.
pub const DEFAULT_X_EXTEND: f32 = 35.0;

/// Padding added above each crop; also the offset of a synthetic block
/// below the block preceding a gap.
pub const DEFAULT_TOP_EXTEND: f32 = 9.0;

/// Padding added below each crop; also the offset of a synthetic block
/// above the block following a gap.
pub const DEFAULT_BOTTOM_EXTEND: f32 = 7.0;

pub const IMAGES_DIR: &str = "images";
pub const SEGMENTS_DIR: &str = "segments";
pub const LAYOUTS_DIR: &str = "layouts";
pub const MANIFEST_FILE: &str = "segments.json";
