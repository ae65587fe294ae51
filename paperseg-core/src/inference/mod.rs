pub mod model;
pub mod yolo;

use image::DynamicImage;

use crate::{error::SegmentError, layout::element::LayoutBlock};

/// Finds layout blocks on a page image.
///
/// Returned boxes are in page-pixel coordinates, in no particular order.
pub trait LayoutDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<LayoutBlock>, SegmentError>;

    /// Whether a model is available to run `detect`.
    fn is_loaded(&self) -> bool {
        true
    }
}
