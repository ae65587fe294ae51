use serde::Serialize;
use tracing::debug;

use crate::layout::element::LayoutBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnLayout {
    Single,
    Double,
}

/// Classifies a page as single- or two-column from its body-text widths.
///
/// Only `Text` and `List` blocks vote. A page whose mean width ratio is above
/// `ratio_threshold` is single-column; a page without body text falls back to
/// single-column so it is ordered by a plain vertical sort.
pub fn classify(blocks: &[LayoutBlock], page_width: f32, ratio_threshold: f32) -> ColumnLayout {
    if page_width <= 0.0 {
        return ColumnLayout::Single;
    }

    let (sum, count) = blocks
        .iter()
        .filter(|block| block.label.is_body_text())
        .fold((0.0_f32, 0_usize), |(sum, count), block| {
            (sum + block.bbox.width() / page_width, count + 1)
        });

    if count == 0 {
        debug!("no text blocks for column statistics, assuming single column");
        return ColumnLayout::Single;
    }

    let mean_ratio = sum / count as f32;
    let layout = if mean_ratio > ratio_threshold {
        ColumnLayout::Single
    } else {
        ColumnLayout::Double
    };
    debug!("mean text width ratio {mean_ratio:.3} over {count} blocks, {layout:?}");

    layout
}
