use std::path::PathBuf;

use image::DynamicImage;
use serde::Serialize;

use crate::{
    analysis::{bbox::Bbox, labels::Label},
    layout::element::LayoutBlock,
    segment::column::ColumnLayout,
};

/// One exported crop of a page, in reading order.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    /// The crop rectangle after margins and clamping, in page pixels.
    pub bbox: Bbox,
    pub label: Label,
    pub path: PathBuf,
    /// 0-based reading-order index; also the file name prefix.
    pub order: usize,
    pub synthetic: bool,
    /// Pixel size of the written image after rescaling.
    pub size: (u32, u32),
    #[serde(skip)]
    pub image: DynamicImage,
}

/// Segmentation result of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageSegments {
    pub index: usize,
    pub layout: ColumnLayout,
    /// Blocks in reading order, synthetic ones included.
    pub blocks: Vec<LayoutBlock>,
    pub segments: Vec<Segment>,
}

impl PageSegments {
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            layout: ColumnLayout::Single,
            blocks: Vec::new(),
            segments: Vec::new(),
        }
    }
}
