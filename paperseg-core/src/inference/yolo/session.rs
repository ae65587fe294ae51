use glam::Vec2;
use image::{DynamicImage, GenericImageView, imageops::FilterType};
use ndarray::prelude::*;
use ort::{
    session::{Session, builder::SessionBuilder},
    value::TensorRef,
};
use snafu::{OptionExt, ResultExt};
use tracing::{debug, info};

use crate::{
    analysis::{bbox::Bbox, labels::Label},
    error::*,
    inference::{
        model::{Model, OnnxSession},
        yolo::model::{YoloInput, YoloLayout, YoloLayoutConfig, YoloOutput},
    },
    layout::element::LayoutBlock,
};

pub struct YoloSession<M: Model> {
    session: Session,
    model: M,
}

/// Page geometry needed to map detections back to page pixels.
#[derive(Debug, Clone, Copy)]
pub struct DetectMeta {
    /// Size of the page image handed to the detector.
    pub image_size: Vec2,
    /// Factor from page pixels to model-input pixels.
    pub scale: f32,
}

impl DetectMeta {
    pub fn new(image: &DynamicImage, config: &YoloLayoutConfig) -> Self {
        let (width, height) = image.dimensions();
        let scale = f32::min(
            config.required_width as f32 / width.max(1) as f32,
            config.required_height as f32 / height.max(1) as f32,
        );

        Self {
            image_size: Vec2::new(width as f32, height as f32),
            scale,
        }
    }
}

impl YoloSession<YoloLayout> {
    pub fn new(session: SessionBuilder, model: YoloLayout) -> Result<Self, SegmentError> {
        let session = session
            .commit_from_file(model.path())
            .context(OrtInitSnafu { stage: "commit" })?;
        info!(
            "Successfully loaded layout model {} from {}",
            YoloLayout::MODEL_NAME,
            model.path().display()
        );

        Ok(Self { session, model })
    }

    pub fn config(&self) -> &YoloLayoutConfig {
        self.model.config()
    }
}

impl OnnxSession<YoloLayout> for YoloSession<YoloLayout> {
    type Output = Vec<LayoutBlock>;
    type Extra = DetectMeta;

    fn preprocess(&self, image: &DynamicImage) -> Result<YoloInput, SegmentError> {
        Ok(letterbox(image, self.model.config()))
    }

    fn postprocess(
        &self,
        output: YoloOutput,
        extra: Self::Extra,
    ) -> Result<Self::Output, SegmentError> {
        let config = self.model.config();

        let mut blocks = extract_blocks(&output, config, &extra)?;
        let raw = blocks.len();

        // merge overlapping boxes
        nms(&mut blocks, config.iou_threshold);
        debug!("kept {} of {} raw detections", blocks.len(), raw);

        Ok(blocks)
    }

    fn infer(
        &mut self,
        input: YoloInput,
        input_name: &str,
        output_name: &str,
    ) -> Result<YoloOutput, SegmentError> {
        let input = TensorRef::from_array_view(&input).context(TensorSnafu { stage: "input" })?;
        let output = self
            .session
            .run(ort::inputs![input_name => input])
            .context(InferenceSnafu {})?;

        let tensor = output
            .get(output_name)
            .context(NotFoundOutputSnafu { output_name })?
            .try_extract_array::<f32>()
            .context(TensorSnafu { stage: "extract" })?;

        // Reshape tensor to expected output dimensions and return owned copy
        let output = tensor
            .to_shape(self.model.config().output_size)
            .context(ShapeSnafu { stage: "output" })?
            .to_owned();

        Ok(output)
    }
}

/// Resizes the page into the top-left corner of the square model input,
/// filling the rest with the background value.
pub fn letterbox(image: &DynamicImage, config: &YoloLayoutConfig) -> YoloInput {
    let meta = DetectMeta::new(image, config);
    let w_new = ((meta.image_size.x * meta.scale).round() as u32)
        .clamp(1, config.required_width as u32);
    let h_new = ((meta.image_size.y * meta.scale).round() as u32)
        .clamp(1, config.required_height as u32);

    let resized_img = image.resize_exact(w_new, h_new, FilterType::Triangle);

    let mut input_tensor = Array4::from_elem(
        [
            config.batch_size,
            config.input_channels,
            config.required_height,
            config.required_width,
        ],
        config.background_fill_value,
    );

    // Fill tensor with normalized pixel values
    for (x, y, pixel) in resized_img.pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b, _] = pixel.0;
        input_tensor[[0, 0, y, x]] = r as f32 / 255.0;
        input_tensor[[0, 1, y, x]] = g as f32 / 255.0;
        input_tensor[[0, 2, y, x]] = b as f32 / 255.0;
    }

    input_tensor
}

/// Decodes `[batch, cxcywh + classes, anchors]` predictions above the
/// confidence threshold into page-pixel blocks.
pub fn extract_blocks(
    output: &YoloOutput,
    config: &YoloLayoutConfig,
    meta: &DetectMeta,
) -> Result<Vec<LayoutBlock>, SegmentError> {
    let mut blocks = Vec::new();

    // Get the first batch slice (assuming batch size = 1)
    let output = output.slice(s![0, .., ..]);
    let letterboxed = meta.image_size * meta.scale;

    for prediction in output.axis_iter(Axis(1)) {
        let bbox = prediction.slice(s![0..config.cxywh_size]);
        let label_end = config.cxywh_size + config.label_size;
        let labels = prediction.slice(s![config.cxywh_size..label_end]);

        let Some((max_prob_idx, &proba)) = labels
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if proba < config.proba_threshold {
            continue;
        }

        let (cx, cy, w, h) = (bbox[0_usize], bbox[1_usize], bbox[2_usize], bbox[3_usize]);
        let bbox = Bbox::from_center_size(Vec2::new(cx, cy), Vec2::new(w, h))
            .clamp(Vec2::ZERO, letterboxed)
            .scale(1. / meta.scale);

        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            continue;
        }

        blocks.push(LayoutBlock::new(bbox, Label::try_from(max_prob_idx)?, proba));
    }

    Ok(blocks)
}

/// Merges detections whose overlap ratio exceeds `threshold` into the more
/// confident one, which keeps its label and grows to the union of both boxes.
pub fn nms(raw_blocks: &mut Vec<LayoutBlock>, threshold: f32) {
    if raw_blocks.len() < 2 {
        return;
    }

    // Higher confidence detections will be processed first and have priority
    raw_blocks.sort_by(|block1, block2| block2.proba.total_cmp(&block1.proba));

    let mut keep_flags = vec![true; raw_blocks.len()];

    for current_index in 0..raw_blocks.len() {
        let current_bbox = raw_blocks[current_index].bbox;

        for kept_index in 0..current_index {
            if !keep_flags[kept_index] {
                continue;
            }

            let overlap_ratio = current_bbox.overlap_ratio(&raw_blocks[kept_index].bbox);

            if overlap_ratio > threshold {
                raw_blocks[kept_index].bbox = raw_blocks[kept_index].bbox.union(&current_bbox);
                keep_flags[current_index] = false;
                break;
            }
        }
    }

    let mut keep = keep_flags.into_iter();
    raw_blocks.retain(|_| keep.next().unwrap_or(false));
}
