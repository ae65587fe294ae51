use std::{path::Path, time::Instant};

use image::DynamicImage;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{consts::*, error::*, layout::page::Page};

/// Turns a PDF document into page images.
pub trait Rasterizer {
    /// Renders every page of `pdf` at `dpi` and hands them to `on_page` one by
    /// one, in page order. Returns the number of pages rendered.
    ///
    /// An error from `on_page` stops rendering and is returned as is.
    fn render_pages(
        &mut self,
        pdf: &Path,
        dpi: u32,
        on_page: &mut dyn FnMut(Page) -> Result<(), SegmentError>,
    ) -> Result<usize, SegmentError>;
}

/// Rasterizer backed by a dynamically loaded pdfium library.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Binds the pdfium library found in the directory named by
    /// `PDFIUM_DYNAMIC_LIB_PATH`.
    pub fn from_env() -> Result<Self, SegmentError> {
        let pdfium_lib_path = std::env::var(PDFIUM_LIB_PATH_ENV_NAME).context(EnvNotFoundSnafu {
            name: PDFIUM_LIB_PATH_ENV_NAME,
        })?;
        let pdfium = Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                &pdfium_lib_path,
            ))
            .context(PdfiumSnafu {
                stage: "load-dyn-lib",
            })?,
        );
        info!("bound pdfium from {pdfium_lib_path}");

        Ok(Self::new(pdfium))
    }
}

/// Render zoom for a target resolution, PDF user space being 72 dpi.
pub fn zoom_factor(dpi: u32) -> f32 {
    dpi as f32 / PDF_POINTS_PER_INCH
}

impl Rasterizer for PdfiumRasterizer {
    fn render_pages(
        &mut self,
        pdf: &Path,
        dpi: u32,
        on_page: &mut dyn FnMut(Page) -> Result<(), SegmentError>,
    ) -> Result<usize, SegmentError> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf, None)
            .context(PdfiumSnafu { stage: "load-pdf" })?;
        let page_count = document.pages().len() as usize;
        info!("rendering {} pages of {} at {dpi} dpi", page_count, pdf.display());

        let render_config = PdfRenderConfig::new().scale_page_by_factor(zoom_factor(dpi));

        let render_start = Instant::now();
        let mut rendered = 0;
        for (page_no, page) in document.pages().iter().enumerate() {
            let instant = Instant::now();
            let image = page
                .render_with_config(&render_config)
                .context(PdfiumSnafu { stage: "render" })?
                .as_image();
            let image = DynamicImage::ImageRgb8(image.to_rgb8());
            debug!(
                "rendered page {} in {}ms",
                page_no + 1,
                instant.elapsed().as_millis()
            );

            on_page(Page::new(image, page_no + 1))?;
            rendered += 1;
        }

        info!(
            "rendered {rendered} pages of {} in {}ms",
            pdf.display(),
            render_start.elapsed().as_millis()
        );

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_factor() {
        assert_eq!(zoom_factor(72), 1.0);
        assert_eq!(zoom_factor(300), 300.0 / 72.0);
    }
}
