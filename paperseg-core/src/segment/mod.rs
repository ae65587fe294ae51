pub mod column;
pub mod draw;
pub mod export;
pub mod order;

use std::path::Path;

use snafu::ensure;
use tracing::{debug, info};

use crate::{
    config::SegmenterConfig,
    error::{ModelUninitializedSnafu, SegmentError},
    inference::LayoutDetector,
    layout::{element::LayoutBlock, page::Page, segment::PageSegments},
    store::ImageStore,
};

pub use column::ColumnLayout;

/// Turns page images into ordered, cropped segment files.
///
/// The segmenter owns the detector handle and the image store for its whole
/// lifetime and processes one page at a time.
pub struct LayoutSegmenter<D, S> {
    detector: D,
    store: S,
    config: SegmenterConfig,
}

impl<D: LayoutDetector, S: ImageStore> LayoutSegmenter<D, S> {
    pub fn new(detector: D, store: S, config: SegmenterConfig) -> Self {
        Self {
            detector,
            store,
            config,
        }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Detects the layout of `page` and writes its segments under `dir`.
    #[tracing::instrument(skip_all, fields(page = page.index))]
    pub fn segment_page(&mut self, page: &Page, dir: &Path) -> Result<PageSegments, SegmentError> {
        if page.is_empty() {
            info!("page {} is empty, nothing to segment", page.index);
            return Ok(PageSegments::empty(page.index));
        }

        ensure!(
            self.detector.is_loaded(),
            ModelUninitializedSnafu { page: page.index }
        );

        let blocks = self.detector.detect(&page.image)?;
        info!("page {} detected {} blocks", page.index, blocks.len());

        self.segment_blocks(page, &blocks, dir)
    }

    /// Runs ordering, gap patching and export on already detected blocks.
    pub fn segment_blocks(
        &mut self,
        page: &Page,
        blocks: &[LayoutBlock],
        dir: &Path,
    ) -> Result<PageSegments, SegmentError> {
        let page_width = page.width as f32;
        let layout = column::classify(blocks, page_width, self.config.column_ratio_threshold);
        let ordered = order::order_blocks(blocks, layout, page_width);

        let ordered = if page.index == 1 && self.config.exempt_first_page {
            debug!("first page, gap patching skipped");
            ordered
        } else {
            order::patch_gaps(
                &ordered,
                self.config.continuous_block_threshold,
                &self.config.margins,
            )
        };

        let segments = export::export_blocks(&ordered, page, dir, &self.config, &mut self.store)?;
        info!(
            "page {} {:?} layout, wrote {} segments to {}",
            page.index,
            layout,
            segments.len(),
            dir.display()
        );

        Ok(PageSegments {
            index: page.index,
            layout,
            blocks: ordered,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{bbox::Bbox, labels::Label},
        testing::{FailingStore, MemoryImageStore, MockDetector, blank_page},
    };

    fn block(x1: f32, y1: f32, x2: f32, y2: f32, label: Label) -> LayoutBlock {
        LayoutBlock::new(Bbox::from_xyxy(x1, y1, x2, y2), label, 0.9)
    }

    /// A single-column page with a 310px hole between the second and third block.
    fn gapped_blocks() -> Vec<LayoutBlock> {
        vec![
            block(60.0, 400.0, 900.0, 450.0, Label::Text),
            block(100.0, 10.0, 800.0, 40.0, Label::Title),
            block(120.0, 50.0, 700.0, 90.0, Label::Text),
        ]
    }

    fn segmenter(
        detector: MockDetector,
    ) -> LayoutSegmenter<MockDetector, MemoryImageStore> {
        LayoutSegmenter::new(detector, MemoryImageStore::default(), SegmenterConfig::default())
    }

    #[test]
    fn test_segment_page_orders_and_patches() {
        let mut segmenter = segmenter(MockDetector::new(gapped_blocks()));
        let page = blank_page(1000, 1000, 2);

        let result = segmenter.segment_page(&page, Path::new("segments/page2")).unwrap();

        assert_eq!(result.index, 2);
        assert_eq!(result.layout, ColumnLayout::Single);
        assert_eq!(result.segments.len(), 4);
        let labels: Vec<_> = result.segments.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec![Label::Title, Label::Text, Label::Text, Label::Text]);
        assert!(result.segments[2].synthetic);
        // synthetic (60, 99, 900, 393) extended by the crop margins
        assert_eq!(result.segments[2].bbox, Bbox::from_xyxy(25.0, 90.0, 935.0, 400.0));
        assert_eq!(
            segmenter.store().paths(),
            vec![
                "segments/page2/000_Title.png",
                "segments/page2/001_Text.png",
                "segments/page2/002_Text.png",
                "segments/page2/003_Text.png",
            ]
        );
    }

    #[test]
    fn test_first_page_is_exempt_from_gap_patching() {
        let mut segmenter = segmenter(MockDetector::new(gapped_blocks()));
        let result = segmenter
            .segment_page(&blank_page(1000, 1000, 1), Path::new("segments/page1"))
            .unwrap();

        assert_eq!(result.segments.len(), 3);
        assert!(result.segments.iter().all(|segment| !segment.synthetic));
    }

    #[test]
    fn test_first_page_exemption_can_be_disabled() {
        let config = SegmenterConfig {
            exempt_first_page: false,
            ..SegmenterConfig::default()
        };
        let mut segmenter = LayoutSegmenter::new(
            MockDetector::new(gapped_blocks()),
            MemoryImageStore::default(),
            config,
        );
        let result = segmenter
            .segment_page(&blank_page(1000, 1000, 1), Path::new("segments/page1"))
            .unwrap();

        assert_eq!(result.segments.iter().filter(|s| s.synthetic).count(), 1);
    }

    #[test]
    fn test_two_column_page_reads_left_column_first() {
        let blocks = vec![
            block(520.0, 20.0, 950.0, 300.0, Label::Text),
            block(50.0, 320.0, 480.0, 400.0, Label::List),
            block(50.0, 20.0, 480.0, 300.0, Label::Text),
            block(520.0, 320.0, 950.0, 400.0, Label::Table),
        ];
        let mut segmenter = segmenter(MockDetector::new(blocks));

        let result = segmenter
            .segment_page(&blank_page(1000, 1000, 3), Path::new("p3"))
            .unwrap();

        assert_eq!(result.layout, ColumnLayout::Double);
        let labels: Vec<_> = result.segments.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec![Label::Text, Label::List, Label::Text, Label::Table]);
        assert!(result.segments[..2].iter().all(|s| s.bbox.center().x <= 500.0));
        assert!(result.segments[2..].iter().all(|s| s.bbox.center().x > 500.0));
    }

    #[test]
    fn test_unloaded_detector_is_fatal() {
        let mut segmenter = segmenter(MockDetector::unloaded());
        let err = segmenter
            .segment_page(&blank_page(100, 100, 4), Path::new("p4"))
            .unwrap_err();

        assert!(matches!(err, SegmentError::ModelUninitialized { page: 4 }));
        assert_eq!(segmenter.detector().calls, 0);
    }

    #[test]
    fn test_empty_page_skips_detection() {
        let mut segmenter = segmenter(MockDetector::unloaded());
        let result = segmenter
            .segment_page(&blank_page(0, 0, 5), Path::new("p5"))
            .unwrap();

        assert!(result.segments.is_empty());
        assert_eq!(segmenter.detector().calls, 0);
        assert!(segmenter.store().images.is_empty());
    }

    #[test]
    fn test_page_without_blocks() {
        let mut segmenter = segmenter(MockDetector::new(Vec::new()));
        let result = segmenter
            .segment_page(&blank_page(200, 200, 2), Path::new("p2"))
            .unwrap();

        assert_eq!(result.layout, ColumnLayout::Single);
        assert!(result.segments.is_empty());
    }

    #[test]
    fn test_write_failure_aborts_page() {
        let mut segmenter = LayoutSegmenter::new(
            MockDetector::new(gapped_blocks()),
            FailingStore::after(2),
            SegmenterConfig::default(),
        );
        let err = segmenter
            .segment_page(&blank_page(1000, 1000, 2), Path::new("p2"))
            .unwrap_err();

        assert!(matches!(err, SegmentError::Io { .. }));
    }

    #[test]
    fn test_segment_blocks_skips_detector() {
        let mut segmenter = segmenter(MockDetector::unloaded());
        let result = segmenter
            .segment_blocks(&blank_page(1000, 1000, 2), &gapped_blocks(), Path::new("p2"))
            .unwrap();

        assert_eq!(result.segments.len(), 4);
        assert_eq!(segmenter.detector().calls, 0);
    }
}
