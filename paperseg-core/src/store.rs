use std::path::Path;

use image::DynamicImage;
use snafu::ResultExt;
use tracing::debug;

use crate::error::{ImageWriteSnafu, IoSnafu, SegmentError};

/// Destination of rendered pages and exported segments.
pub trait ImageStore {
    /// Writes `image` to `path`, the format follows the extension.
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<(), SegmentError>;
}

/// Writes images to the local filesystem, creating parent directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageStore;

impl ImageStore for FsImageStore {
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<(), SegmentError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context(IoSnafu {
                path: parent.to_string_lossy(),
            })?;
        }

        image.save(path).context(ImageWriteSnafu {
            path: path.to_string_lossy(),
        })?;
        debug!("wrote {}x{} image to {}", image.width(), image.height(), path.display());

        Ok(())
    }
}
