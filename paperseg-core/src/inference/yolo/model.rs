use std::path::{Path, PathBuf};

use ndarray::{ArrayBase, Dim, OwnedRepr};

use crate::{
    config::DetectorConfig,
    consts::{
        BACKGROUND_FILL_VALUE, BATCH_SIZE, CXYWH_OFFSET, INPUT_CHANNELS, LABEL_PROBA_SIZE,
        LABEL_SIZE, YOLO_STRIDES,
    },
    inference::model::Model,
};

/// YOLO layout model trained on PubLayNet (Text, Title, List, Table, Figure).
pub struct YoloLayout {
    path: PathBuf,
    config: YoloLayoutConfig,
}

pub type YoloInput = ArrayBase<OwnedRepr<f32>, Dim<[usize; 4]>>;
pub type YoloOutput = ArrayBase<OwnedRepr<f32>, Dim<[usize; 3]>>;

#[derive(Debug, Clone)]
pub struct YoloLayoutConfig {
    pub required_width: usize,
    pub required_height: usize,
    pub batch_size: usize,
    pub input_channels: usize,
    pub background_fill_value: f32,
    pub output_size: [usize; 3],
    pub cxywh_size: usize,
    pub label_size: usize,
    pub proba_threshold: f32,
    pub iou_threshold: f32,
}

impl YoloLayoutConfig {
    pub fn from_detector(config: &DetectorConfig) -> Self {
        let size = config.input_size;
        Self {
            required_width: size,
            required_height: size,
            batch_size: BATCH_SIZE,
            input_channels: INPUT_CHANNELS,
            background_fill_value: BACKGROUND_FILL_VALUE,
            output_size: [BATCH_SIZE, LABEL_PROBA_SIZE, anchor_count(size)],
            cxywh_size: CXYWH_OFFSET,
            label_size: LABEL_SIZE,
            proba_threshold: config.proba_threshold,
            iou_threshold: config.iou_threshold,
        }
    }
}

impl Default for YoloLayoutConfig {
    fn default() -> Self {
        Self::from_detector(&DetectorConfig::default())
    }
}

/// Number of predictions a YOLO head emits for a square input of `size`.
pub fn anchor_count(size: usize) -> usize {
    YOLO_STRIDES
        .iter()
        .map(|stride| (size / stride) * (size / stride))
        .sum()
}

impl YoloLayout {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            path: config.model_path.clone(),
            config: YoloLayoutConfig::from_detector(config),
        }
    }
}

impl Model for YoloLayout {
    type Input = YoloInput;

    type Output = YoloOutput;
    type Config = YoloLayoutConfig;

    const INPUT_NAME: &'static str = "images";

    const OUTPUT_NAME: &'static str = "output0";

    const MODEL_NAME: &'static str = "yolo-publaynet";

    fn path(&self) -> &Path {
        &self.path
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}
