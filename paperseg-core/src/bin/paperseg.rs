use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use paperseg_core::{
    config::Config,
    document::DocumentProcessor,
    inference::yolo::YoloDetector,
    layout::page::Page,
    render::PdfiumRasterizer,
    segment::LayoutSegmenter,
    store::FsImageStore,
};

#[derive(Parser)]
#[command(name = "paperseg")]
#[command(about = "Split research paper pages into ordered layout segments")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process the PDF found in a paper workspace directory
    Pdf {
        #[arg(help = "Workspace directory containing the PDF")]
        workspace: PathBuf,
    },
    /// Segment a single rendered page image
    Page {
        #[arg(help = "Page image path")]
        path: PathBuf,

        #[arg(help = "Directory receiving the segments")]
        out_dir: PathBuf,

        #[arg(long, default_value = "2", help = "1-based page number")]
        index: usize,
    },
}

#[derive(Args)]
struct Overrides {
    #[arg(short, long, global = true, help = "TOML configuration file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Layout model path")]
    model: Option<PathBuf>,

    #[arg(long, global = true, help = "Rendering resolution")]
    dpi: Option<u32>,

    #[arg(long, global = true, help = "Largest crop side in max-width mode")]
    max_width: Option<u32>,

    #[arg(long, global = true, help = "Scale crops to a fixed height")]
    fix_size: bool,

    #[arg(long, global = true, help = "Target height in fixed-height mode")]
    fix_length: Option<u32>,

    #[arg(long, global = true, help = "Save detected boxes drawn on every page")]
    debug_overlay: bool,
}

impl Overrides {
    fn load(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(model) = &self.model {
            config.detector.model_path = model.clone();
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(max_width) = self.max_width {
            config.segmenter.max_width = max_width;
        }
        if let Some(fix_length) = self.fix_length {
            config.segmenter.fix_length = fix_length;
        }
        config.segmenter.fix_size |= self.fix_size;
        config.debug_overlay |= self.debug_overlay;

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.overrides.load()?;

    let mut detector = YoloDetector::new(config.detector.clone());
    detector.load()?;

    match cli.command {
        Command::Pdf { workspace } => {
            let rasterizer = PdfiumRasterizer::from_env()?;
            let mut processor =
                DocumentProcessor::new(rasterizer, detector, FsImageStore, &config);
            let document = processor.process(&workspace)?;

            info!(
                "{}: {} pages, {} segments",
                document.pdf_path.display(),
                document.pages.len(),
                document.segment_count()
            );
        }
        Command::Page {
            path,
            out_dir,
            index,
        } => {
            let page = Page::open(&path, index)?;

            let mut segmenter = LayoutSegmenter::new(detector, FsImageStore, config.segmenter);
            let result = segmenter.segment_page(&page, &out_dir)?;
            for segment in &result.segments {
                info!("{} {}", segment.label, segment.path.display());
            }
        }
    }

    Ok(())
}
