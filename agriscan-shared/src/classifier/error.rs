/// Error type for classifier loading and classification
///
/// `ModelLoad` and `LabelLoad` only occur at startup and must abort the
/// process. `Decode` and `Inference` are per-request failures.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Model file missing or not loadable
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// Label file missing, unreadable or empty
    #[error("Failed to load labels: {0}")]
    LabelLoad(String),

    /// Uploaded bytes are not a decodable image
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// Tensor execution failed or produced an unusable output
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl ClassifierError {
    /// Short machine-readable code for error responses
    pub fn code(&self) -> &'static str {
        match self {
            ClassifierError::ModelLoad(_) => "model_load_error",
            ClassifierError::LabelLoad(_) => "label_load_error",
            ClassifierError::Decode(_) => "decode_error",
            ClassifierError::Inference(_) => "inference_error",
        }
    }
}
