//! Whole-document processing inside a paper workspace directory.
//!
//! A workspace holds one PDF somewhere below its root. Processing produces:
//!
//! ```text
//! <root>/images/page1.png            rendered page
//! <root>/segments/page1/000_Title.png
//! <root>/segments/page1/segments.json
//! <root>/layouts/page1.png           detected boxes, with debug_overlay
//! ```

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::DynamicImage;
use serde::Serialize;
use snafu::{OptionExt, ResultExt};
use tracing::info;
use walkdir::WalkDir;

use crate::{
    config::Config,
    consts::*,
    error::*,
    inference::LayoutDetector,
    layout::{page::Page, segment::PageSegments},
    render::Rasterizer,
    segment::{LayoutSegmenter, draw::draw_layout},
    store::ImageStore,
};

/// Directory layout of one paper.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub pdf_path: PathBuf,
    pub images_dir: PathBuf,
    pub segments_dir: PathBuf,
    pub layouts_dir: PathBuf,
}

impl Workspace {
    /// Locates the PDF below `root`; output directories are not created yet.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, SegmentError> {
        let root = root.as_ref().to_path_buf();
        let pdf_path = find_pdf(&root)?;

        Ok(Self {
            images_dir: root.join(IMAGES_DIR),
            segments_dir: root.join(SEGMENTS_DIR),
            layouts_dir: root.join(LAYOUTS_DIR),
            pdf_path,
            root,
        })
    }

    pub fn create_dirs(&self) -> Result<(), SegmentError> {
        for dir in [&self.images_dir, &self.segments_dir, &self.layouts_dir] {
            std::fs::create_dir_all(dir).context(IoSnafu {
                path: dir.to_string_lossy(),
            })?;
        }
        Ok(())
    }

    pub fn page_image_path(&self, index: usize) -> PathBuf {
        self.images_dir.join(format!("page{index}.png"))
    }

    pub fn segment_dir(&self, index: usize) -> PathBuf {
        self.segments_dir.join(format!("page{index}"))
    }

    pub fn layout_path(&self, index: usize) -> PathBuf {
        self.layouts_dir.join(format!("page{index}.png"))
    }
}

/// First `*.pdf` below `root`, in file name order.
pub fn find_pdf(root: &Path) -> Result<PathBuf, SegmentError> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .find(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .context(PdfNotFoundSnafu {
            path: root.to_string_lossy(),
        })
}

/// Summary of a processed document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSegments {
    pub pdf_path: PathBuf,
    pub pages: Vec<PageSegments>,
}

impl DocumentSegments {
    pub fn segment_count(&self) -> usize {
        self.pages.iter().map(|page| page.segments.len()).sum()
    }
}

/// Renders a workspace PDF and segments it page by page.
pub struct DocumentProcessor<R, D, S> {
    rasterizer: R,
    segmenter: LayoutSegmenter<D, S>,
    dpi: u32,
    debug_overlay: bool,
}

impl<R: Rasterizer, D: LayoutDetector, S: ImageStore> DocumentProcessor<R, D, S> {
    pub fn new(rasterizer: R, detector: D, store: S, config: &Config) -> Self {
        Self {
            rasterizer,
            segmenter: LayoutSegmenter::new(detector, store, config.segmenter.clone()),
            dpi: config.dpi,
            debug_overlay: config.debug_overlay,
        }
    }

    pub fn segmenter(&self) -> &LayoutSegmenter<D, S> {
        &self.segmenter
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Processes the PDF of the workspace at `root`.
    ///
    /// Each page is finished before the next one is rendered; the first
    /// failing page aborts the document.
    #[tracing::instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn process<P: AsRef<Path>>(&mut self, root: P) -> Result<DocumentSegments, SegmentError> {
        let workspace = Workspace::open(root)?;
        workspace.create_dirs()?;
        info!("processing {}", workspace.pdf_path.display());

        let mut pages = Vec::new();
        let segmenter = &mut self.segmenter;
        let debug_overlay = self.debug_overlay;

        self.rasterizer
            .render_pages(&workspace.pdf_path, self.dpi, &mut |page: Page| {
                let result = process_page(segmenter, &workspace, &page, debug_overlay)?;
                pages.push(result);
                Ok(())
            })?;

        let document = DocumentSegments {
            pdf_path: workspace.pdf_path,
            pages,
        };
        info!(
            "finished {} pages, {} segments",
            document.pages.len(),
            document.segment_count()
        );

        Ok(document)
    }
}

fn process_page<D: LayoutDetector, S: ImageStore>(
    segmenter: &mut LayoutSegmenter<D, S>,
    workspace: &Workspace,
    page: &Page,
    debug_overlay: bool,
) -> Result<PageSegments, SegmentError> {
    if !page.is_empty() {
        segmenter
            .store_mut()
            .write(&workspace.page_image_path(page.index), &page.image)?;
    }

    let segment_dir = workspace.segment_dir(page.index);
    let result = segmenter.segment_page(page, &segment_dir)?;
    write_manifest(&segment_dir, &result)?;

    if debug_overlay && !page.is_empty() {
        let overlay = draw_layout(&page.image, &result.blocks);
        segmenter.store_mut().write(
            &workspace.layout_path(page.index),
            &DynamicImage::ImageRgb8(overlay),
        )?;
    }

    Ok(result)
}

/// Writes `segments.json` into `dir`.
pub fn write_manifest(dir: &Path, segments: &PageSegments) -> Result<PathBuf, SegmentError> {
    std::fs::create_dir_all(dir).context(IoSnafu {
        path: dir.to_string_lossy(),
    })?;

    let path = dir.join(MANIFEST_FILE);
    let file = File::create(&path).context(IoSnafu {
        path: path.to_string_lossy(),
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), segments).context(ManifestSnafu {
        path: path.to_string_lossy(),
    })?;

    Ok(path)
}
