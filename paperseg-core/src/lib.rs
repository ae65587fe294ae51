//! Layout segmentation of research paper pages.
//!
//! A [`document::DocumentProcessor`] renders a PDF with a
//! [`render::Rasterizer`], detects layout blocks with an
//! [`inference::LayoutDetector`] and hands every page to the
//! [`segment::LayoutSegmenter`], which orders the blocks, patches missed
//! gaps and writes one numbered image per block through an
//! [`store::ImageStore`].

pub mod analysis;
pub mod config;
pub mod consts;
pub mod document;
pub mod error;
pub mod inference;
pub mod layout;
pub mod render;
pub mod segment;
pub mod store;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{Config, DetectorConfig, SegmenterConfig};
pub use document::{DocumentProcessor, DocumentSegments, Workspace};
pub use error::SegmentError;
pub use inference::{LayoutDetector, yolo::YoloDetector};
pub use layout::{element::LayoutBlock, page::Page, segment::PageSegments, segment::Segment};
pub use render::{PdfiumRasterizer, Rasterizer};
pub use segment::{ColumnLayout, LayoutSegmenter};
pub use store::{FsImageStore, ImageStore};
