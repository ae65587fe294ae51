use std::path::Path;

use glam::Vec2;
use image::{DynamicImage, imageops::FilterType};
use tracing::{debug, warn};

use crate::{
    analysis::{bbox::Bbox, labels::Label},
    config::{CropMargins, SegmenterConfig},
    error::SegmentError,
    layout::{element::LayoutBlock, page::Page, segment::Segment},
    store::ImageStore,
};

/// `003_Table.png`
pub fn segment_file_name(order: usize, label: Label) -> String {
    format!("{order:03}_{}.png", label.name())
}

/// Pads `bbox` by the margins and clamps it to the page, snapped to whole pixels.
///
/// Returns `None` when nothing of the block is left on the page.
pub fn crop_rect(
    bbox: &Bbox,
    margins: &CropMargins,
    page_width: u32,
    page_height: u32,
) -> Option<Bbox> {
    let page_size = Vec2::new(page_width as f32, page_height as f32);

    let extended = Bbox::from_xyxy(
        (bbox.min.x - margins.x_extend).floor(),
        (bbox.min.y - margins.top).floor(),
        (bbox.max.x + margins.x_extend).floor(),
        (bbox.max.y + margins.bottom).floor(),
    )
    .clamp(Vec2::ZERO, page_size);

    if extended.width() < 1.0 || extended.height() < 1.0 {
        return None;
    }

    Some(extended)
}

/// Applies the rescale policy: figures keep their resolution, other crops are
/// either brought to `fix_length` height (fixed-height mode) or capped so the
/// larger side is at most `max_width`.
pub fn rescale(image: DynamicImage, label: Label, config: &SegmenterConfig) -> DynamicImage {
    if label == Label::Figure {
        return image;
    }

    let (width, height) = (image.width(), image.height());

    if config.fix_size && config.fix_length > 0 && height > config.fix_length {
        let new_width = scale_side(width, config.fix_length, height);
        return image.resize_exact(new_width, config.fix_length, FilterType::Triangle);
    }

    let max_width = config.max_width.max(1);
    if width <= max_width && height <= max_width {
        return image;
    }

    let (new_width, new_height) = if width >= height {
        (max_width, scale_side(height, max_width, width))
    } else {
        (scale_side(width, max_width, height), max_width)
    };
    image.resize_exact(new_width, new_height, FilterType::Triangle)
}

/// `side * target / reference`, never below one pixel.
fn scale_side(side: u32, target: u32, reference: u32) -> u32 {
    let scaled = side as u64 * target as u64 / reference.max(1) as u64;
    (scaled as u32).max(1)
}

/// Crops, rescales and writes every block in order.
///
/// Blocks whose crop collapses after clamping are skipped and do not consume
/// an order index, so the written files stay contiguously numbered. A failed
/// write aborts the page.
pub fn export_blocks<S: ImageStore>(
    blocks: &[LayoutBlock],
    page: &Page,
    dir: &Path,
    config: &SegmenterConfig,
    store: &mut S,
) -> Result<Vec<Segment>, SegmentError> {
    let mut segments = Vec::with_capacity(blocks.len());

    for block in blocks {
        let Some(rect) = crop_rect(&block.bbox, &config.margins, page.width, page.height) else {
            warn!(
                "skip {} block {:?} on page {}, crop is empty",
                block.label, block.bbox, page.index
            );
            continue;
        };

        let crop = page.image.crop_imm(
            rect.min.x as u32,
            rect.min.y as u32,
            rect.width() as u32,
            rect.height() as u32,
        );
        let image = rescale(crop, block.label, config);

        let order = segments.len();
        let path = dir.join(segment_file_name(order, block.label));
        store.write(&path, &image)?;
        debug!(
            "segment {order} {} {}x{} -> {}",
            block.label,
            image.width(),
            image.height(),
            path.display()
        );

        segments.push(Segment {
            bbox: rect,
            label: block.label,
            path,
            order,
            synthetic: block.synthetic,
            size: (image.width(), image.height()),
            image,
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingStore, MemoryImageStore, blank_page};

    fn config() -> SegmenterConfig {
        SegmenterConfig::default()
    }

    fn image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::new_rgb8(width, height)
    }

    #[test]
    fn test_file_name_is_zero_padded() {
        assert_eq!(segment_file_name(0, Label::Title), "000_Title.png");
        assert_eq!(segment_file_name(42, Label::Table), "042_Table.png");
        assert_eq!(segment_file_name(1234, Label::Text), "1234_Text.png");
    }

    #[test]
    fn test_crop_rect_adds_margins() {
        let bbox = Bbox::from_xyxy(100.4, 200.0, 500.6, 300.0);
        let rect = crop_rect(&bbox, &CropMargins::default(), 1000, 1000).unwrap();
        assert_eq!(rect, Bbox::from_xyxy(65.0, 191.0, 535.0, 307.0));
    }

    #[test]
    fn test_crop_rect_clamps_to_page() {
        let bbox = Bbox::from_xyxy(10.0, 3.0, 990.0, 996.0);
        let rect = crop_rect(&bbox, &CropMargins::default(), 1000, 1000).unwrap();
        assert_eq!(rect, Bbox::from_xyxy(0.0, 0.0, 1000.0, 1000.0));
    }

    #[test]
    fn test_crop_rect_outside_page_is_degenerate() {
        let bbox = Bbox::from_xyxy(1100.0, 100.0, 1200.0, 200.0);
        assert!(crop_rect(&bbox, &CropMargins::default(), 1000, 1000).is_none());

        let below = Bbox::from_xyxy(100.0, 1010.0, 200.0, 1050.0);
        assert!(crop_rect(&below, &CropMargins::default(), 1000, 1000).is_none());
    }

    #[test]
    fn test_rescale_max_width_caps_larger_side() {
        let wide = rescale(image(2400, 300), Label::Text, &config());
        assert_eq!((wide.width(), wide.height()), (1200, 150));

        let tall = rescale(image(600, 1800), Label::Table, &config());
        assert_eq!((tall.width(), tall.height()), (400, 1200));

        let small = rescale(image(800, 100), Label::Text, &config());
        assert_eq!((small.width(), small.height()), (800, 100));
    }

    #[test]
    fn test_rescale_fixed_height() {
        let mut config = config();
        config.fix_size = true;

        let tall = rescale(image(1000, 1344), Label::Text, &config);
        assert_eq!((tall.width(), tall.height()), (500, 672));

        // short crops fall through to the max width cap
        let wide = rescale(image(2400, 300), Label::Text, &config);
        assert_eq!((wide.width(), wide.height()), (1200, 150));
    }

    #[test]
    fn test_rescale_keeps_figures() {
        let mut fixed = config();
        fixed.fix_size = true;

        for config in [config(), fixed] {
            let figure = rescale(image(2400, 1800), Label::Figure, &config);
            assert_eq!((figure.width(), figure.height()), (2400, 1800));
        }
    }

    #[test]
    fn test_rescale_never_collapses_to_zero() {
        let sliver = rescale(image(5000, 1), Label::Text, &config());
        assert_eq!((sliver.width(), sliver.height()), (1200, 1));
    }

    #[test]
    fn test_export_numbers_segments_contiguously() {
        let page = blank_page(1000, 1000, 2);
        let blocks = [
            LayoutBlock::new(Bbox::from_xyxy(100.0, 50.0, 900.0, 100.0), Label::Title, 0.9),
            LayoutBlock::new(Bbox::from_xyxy(2000.0, 50.0, 2100.0, 100.0), Label::Text, 0.9),
            LayoutBlock::new(Bbox::from_xyxy(100.0, 200.0, 900.0, 600.0), Label::Figure, 0.9),
        ];
        let mut store = MemoryImageStore::default();

        let segments =
            export_blocks(&blocks, &page, Path::new("seg"), &config(), &mut store).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].path, Path::new("seg/000_Title.png"));
        assert_eq!(segments[1].path, Path::new("seg/001_Figure.png"));
        assert_eq!(segments[1].order, 1);
        assert_eq!(segments[1].size, (870, 416));
        assert_eq!(store.paths(), vec!["seg/000_Title.png", "seg/001_Figure.png"]);
    }

    #[test]
    fn test_export_propagates_write_failure() {
        let page = blank_page(1000, 1000, 2);
        let blocks = [
            LayoutBlock::new(Bbox::from_xyxy(100.0, 50.0, 900.0, 100.0), Label::Title, 0.9),
            LayoutBlock::new(Bbox::from_xyxy(100.0, 200.0, 900.0, 600.0), Label::Text, 0.9),
        ];
        let mut store = FailingStore::after(1);

        let err = export_blocks(&blocks, &page, Path::new("seg"), &config(), &mut store)
            .unwrap_err();
        assert!(matches!(err, SegmentError::Io { .. }));
    }
}
