pub mod model;
pub mod session;

use image::DynamicImage;
use snafu::OptionExt;
use tracing::{debug, info};

use crate::{
    config::DetectorConfig,
    error::{ModelNotLoadedSnafu, SegmentError},
    inference::{LayoutDetector, model::OnnxSession, model::session_builder},
    layout::element::LayoutBlock,
};

pub use model::{YoloLayout, YoloLayoutConfig};
pub use session::{DetectMeta, YoloSession};

/// [`LayoutDetector`] backed by the YOLO PubLayNet model.
///
/// Building the detector only records its settings; the ONNX session is
/// created by [`YoloDetector::load`] and reused for every page.
pub struct YoloDetector {
    config: DetectorConfig,
    session: Option<YoloSession<YoloLayout>>,
}

impl YoloDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Loads the model, a no-op once loaded.
    pub fn load(&mut self) -> Result<(), SegmentError> {
        if self.session.is_some() {
            return Ok(());
        }

        info!("loading layout model from {}", self.config.model_path.display());
        let builder = session_builder(self.config.intra_threads)?;
        self.session = Some(YoloSession::new(builder, YoloLayout::new(&self.config))?);

        Ok(())
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl LayoutDetector for YoloDetector {
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<LayoutBlock>, SegmentError> {
        let session = self.session.as_mut().context(ModelNotLoadedSnafu {
            model_path: self.config.model_path.to_string_lossy(),
        })?;

        let meta = DetectMeta::new(image, session.config());
        let blocks = session.run(image, meta)?;
        debug!("detected {} layout blocks", blocks.len());

        Ok(blocks)
    }

    fn is_loaded(&self) -> bool {
        self.session.is_some()
    }
}
