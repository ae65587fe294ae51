use serde::Serialize;

use crate::analysis::{bbox::Bbox, labels::Label};

/// A detected (or synthesized) layout region of one page.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct LayoutBlock {
    pub bbox: Bbox,
    pub label: Label,
    pub proba: f32,
    /// Inserted by gap patching rather than reported by the detector.
    pub synthetic: bool,
}

impl LayoutBlock {
    pub fn new(bbox: Bbox, label: Label, proba: f32) -> Self {
        Self {
            bbox,
            label,
            proba,
            synthetic: false,
        }
    }

    /// A text block covering a region the detector is assumed to have missed.
    pub fn synthetic(bbox: Bbox) -> Self {
        Self {
            bbox,
            label: Label::Text,
            proba: 0.0,
            synthetic: true,
        }
    }
}
