use tracing::debug;

use crate::{
    analysis::bbox::Bbox, config::CropMargins, layout::element::LayoutBlock,
    segment::column::ColumnLayout,
};

/// Returns the blocks in reading order without touching the detector output.
///
/// Single-column pages read top to bottom. Two-column pages read the left
/// column top to bottom, then the right one; a block belongs to the left
/// column when its horizontal center is not right of the page midline, so
/// full-width titles and captions are read with the left column.
pub fn order_blocks(
    blocks: &[LayoutBlock],
    layout: ColumnLayout,
    page_width: f32,
) -> Vec<LayoutBlock> {
    match layout {
        ColumnLayout::Single => {
            let mut ordered = blocks.to_vec();
            sort_by_top(&mut ordered);
            ordered
        }
        ColumnLayout::Double => {
            let mid_x = page_width / 2.0;
            let (mut left_column, mut right_column): (Vec<_>, Vec<_>) = blocks
                .iter()
                .copied()
                .partition(|block| block.bbox.center().x <= mid_x);

            sort_by_top(&mut left_column);
            sort_by_top(&mut right_column);

            left_column.extend(right_column);
            left_column
        }
    }
}

/// Inserts a synthetic text block wherever two consecutive blocks leave a
/// vertical gap larger than `threshold`.
///
/// The synthetic block sits right before the block following the gap. For a
/// single-column sequence this is the position a re-sort by `y1` would give
/// it; for a two-column sequence it keeps the block in the column it was
/// found in.
pub fn patch_gaps(
    ordered: &[LayoutBlock],
    threshold: f32,
    margins: &CropMargins,
) -> Vec<LayoutBlock> {
    let Some(first) = ordered.first() else {
        return Vec::new();
    };

    let mut patched = Vec::with_capacity(ordered.len());
    patched.push(*first);

    for pair in ordered.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);
        if let Some(gap_block) = gap_block(prev, current, threshold, margins) {
            debug!(
                "gap of {:.0}px between y={:.0} and y={:.0}, inserting synthetic text block",
                current.bbox.min.y - prev.bbox.max.y,
                prev.bbox.max.y,
                current.bbox.min.y
            );
            patched.push(gap_block);
        }
        patched.push(*current);
    }

    patched
}

fn gap_block(
    prev: &LayoutBlock,
    current: &LayoutBlock,
    threshold: f32,
    margins: &CropMargins,
) -> Option<LayoutBlock> {
    if current.bbox.min.y - prev.bbox.max.y <= threshold {
        return None;
    }

    let bbox = Bbox::from_xyxy(
        current.bbox.min.x.min(prev.bbox.max.x),
        prev.bbox.max.y + margins.top,
        current.bbox.max.x.max(prev.bbox.max.x),
        current.bbox.min.y - margins.bottom,
    );

    // thresholds smaller than the margins would leave nothing to crop
    if bbox.height() <= 0.0 || bbox.width() <= 0.0 {
        return None;
    }

    Some(LayoutBlock::synthetic(bbox))
}

fn sort_by_top(blocks: &mut [LayoutBlock]) {
    blocks.sort_by(|a, b| a.bbox.min.y.total_cmp(&b.bbox.min.y));
}
