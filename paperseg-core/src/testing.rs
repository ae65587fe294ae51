//! Test doubles shared by the unit tests.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};

use crate::{
    error::SegmentError, inference::LayoutDetector, layout::element::LayoutBlock,
    layout::page::Page, render::Rasterizer, store::ImageStore,
};

pub fn blank_page(width: u32, height: u32, index: usize) -> Page {
    let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    Page::new(DynamicImage::ImageRgb8(image), index)
}

/// Returns the same blocks for every page and counts calls.
#[derive(Debug, Default)]
pub struct MockDetector {
    pub blocks: Vec<LayoutBlock>,
    pub loaded: bool,
    pub calls: usize,
}

impl MockDetector {
    pub fn new(blocks: Vec<LayoutBlock>) -> Self {
        Self {
            blocks,
            loaded: true,
            calls: 0,
        }
    }

    pub fn unloaded() -> Self {
        Self::default()
    }
}

impl LayoutDetector for MockDetector {
    fn detect(&mut self, _image: &DynamicImage) -> Result<Vec<LayoutBlock>, SegmentError> {
        self.calls += 1;
        Ok(self.blocks.clone())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}

#[derive(Debug, Default)]
pub struct MemoryImageStore {
    pub images: Vec<(PathBuf, DynamicImage)>,
}

impl MemoryImageStore {
    pub fn paths(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|(path, _)| path.to_string_lossy().into_owned())
            .collect()
    }
}

impl ImageStore for MemoryImageStore {
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<(), SegmentError> {
        self.images.push((path.to_path_buf(), image.clone()));
        Ok(())
    }
}

/// Accepts `remaining` writes, then fails every following one.
#[derive(Debug)]
pub struct FailingStore {
    remaining: usize,
}

impl FailingStore {
    pub fn after(remaining: usize) -> Self {
        Self { remaining }
    }
}

impl ImageStore for FailingStore {
    fn write(&mut self, path: &Path, _image: &DynamicImage) -> Result<(), SegmentError> {
        if self.remaining == 0 {
            return Err(SegmentError::Io {
                source: std::io::Error::other("disk full"),
                path: path.to_string_lossy().into_owned(),
            });
        }
        self.remaining -= 1;
        Ok(())
    }
}

/// Produces blank pages of a fixed size instead of reading the PDF.
#[derive(Debug)]
pub struct FakeRasterizer {
    pub pages: usize,
    pub size: (u32, u32),
    pub rendered: Vec<(PathBuf, u32)>,
}

impl FakeRasterizer {
    pub fn new(pages: usize, width: u32, height: u32) -> Self {
        Self {
            pages,
            size: (width, height),
            rendered: Vec::new(),
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn render_pages(
        &mut self,
        pdf: &Path,
        dpi: u32,
        on_page: &mut dyn FnMut(Page) -> Result<(), SegmentError>,
    ) -> Result<usize, SegmentError> {
        self.rendered.push((pdf.to_path_buf(), dpi));
        for index in 1..=self.pages {
            on_page(blank_page(self.size.0, self.size.1, index))?;
        }
        Ok(self.pages)
    }
}
