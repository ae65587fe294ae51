use std::path::Path;

use image::DynamicImage;
use snafu::ResultExt;

use crate::error::{ImageReadSnafu, SegmentError};

/// A rasterized PDF page.
#[derive(Debug, Clone)]
pub struct Page {
    pub image: DynamicImage,
    pub width: u32,
    pub height: u32,
    /// 1-based page number within the document.
    pub index: usize,
}

impl Page {
    pub fn new(image: DynamicImage, index: usize) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            image,
            index,
        }
    }

    /// Loads an already rendered page image from disk.
    pub fn open<P: AsRef<Path>>(path: P, index: usize) -> Result<Self, SegmentError> {
        let path = path.as_ref();
        let image = image::open(path).context(ImageReadSnafu {
            path: path.to_string_lossy(),
        })?;

        Ok(Self::new(image, index))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
