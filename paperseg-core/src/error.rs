use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SegmentError {
    #[snafu(display("Ort Session init stage `{}` error: {}", stage, source))]
    OrtInit {
        source: ort::error::Error,
        stage: String,
    },
    #[snafu(display("Build Tensor for `{}` error: {}", stage, source))]
    Tensor {
        source: ort::error::Error,
        stage: String,
    },
    #[snafu(display("Onnx Inference error: {}", source))]
    Inference { source: ort::error::Error },
    #[snafu(display("Onnx Output can not found {}", output_name))]
    NotFoundOutput { output_name: String },
    #[snafu(display("Ndarray Shape error at stage `{}`: {}", stage, source))]
    Shape {
        source: ndarray::ShapeError,
        stage: String,
    },
    #[snafu(display("Layout model is not loaded, can not segment page {}", page))]
    ModelUninitialized { page: usize },
    #[snafu(display("Layout model `{}` is not loaded, call load first", model_path))]
    ModelNotLoaded { model_path: String },
    #[snafu(display("Unknown layout label index {}", idx))]
    UnknownLabel { idx: usize },
    #[snafu(display("Image Read `{}` error: {}", path, source))]
    ImageRead {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Image Write `{}` error: {}", path, source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Io `{}` error: {}", path, source))]
    Io {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Environment `{}` Not Found, error {}", name, source))]
    EnvNotFound {
        source: std::env::VarError,
        name: String,
    },
    #[snafu(display("Pdfium `{}` error {}", stage, source))]
    Pdfium {
        source: pdfium_render::prelude::PdfiumError,
        stage: String,
    },
    #[snafu(display("No pdf file found under `{}`", path))]
    PdfNotFound { path: String },
    #[snafu(display("Read config `{}` error: {}", path, source))]
    ConfigRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Parse config `{}` error: {}", path, source))]
    ConfigParse {
        source: toml::de::Error,
        path: String,
    },
    #[snafu(display("Write manifest `{}` error: {}", path, source))]
    Manifest {
        source: serde_json::Error,
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_uninitialized_display() {
        let err = ModelUninitializedSnafu { page: 3_usize }.build();
        assert_eq!(
            err.to_string(),
            "Layout model is not loaded, can not segment page 3"
        );
    }

    #[test]
    fn test_model_not_loaded_names_model() {
        let err = ModelNotLoadedSnafu {
            model_path: "models/publaynet-yolo.onnx",
        }
        .build();
        assert_eq!(
            err.to_string(),
            "Layout model `models/publaynet-yolo.onnx` is not loaded, call load first"
        );
    }

    #[test]
    fn test_io_context_keeps_path() {
        let result: Result<(), SegmentError> =
            Err(std::io::Error::other("disk full")).context(IoSnafu {
                path: "segments/page2/000_Text.png",
            });
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("segments/page2/000_Text.png"), "got: {msg}");
        assert!(msg.contains("disk full"), "got: {msg}");
    }
}
