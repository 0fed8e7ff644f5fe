/// Plant disease image classifier
///
/// The classifier is loaded once at startup from a model file and a label
/// file, then shared read-only between request handlers. Classification is
/// a pure function of the image bytes and the loaded model:
///
/// 1. decode bytes (any format the `image` crate is built with) to RGB
/// 2. resize to the model's declared square input size
/// 3. scale pixel values to `[0, 1]`
/// 4. run the model and take the argmax over its scores
///
/// Ties resolve to the lowest index. The reported confidence is the raw
/// score at that index, not a renormalized probability.
///
/// # Example
///
/// ```no_run
/// use agriscan_shared::classifier::{ImageClassifier, ResizeFilter};
/// use std::path::Path;
///
/// let classifier = ImageClassifier::load(
///     Path::new("plant_disease_model.onnx"),
///     Path::new("label_map.txt"),
///     ResizeFilter::Bilinear,
/// )?;
/// let bytes = std::fs::read("leaf.jpg")?;
/// let result = classifier.classify(&bytes)?;
/// println!("{} ({:.2})", result.label, result.confidence);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```

pub mod error;
pub mod labels;
pub mod model;
pub mod preprocess;

pub use error::ClassifierError;
pub use model::{InferenceModel, OnnxModel};
pub use preprocess::{InputSpec, ResizeFilter, TensorLayout};

use serde::Serialize;
use std::path::Path;

/// Outcome of classifying one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Label of the highest-scoring class
    pub label: String,

    /// Raw model score for that class
    pub confidence: f32,
}

/// Index and value of the highest score, first occurrence on ties
///
/// Returns `None` for an empty slice. NaN scores never win.
pub fn select_top(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        let beaten = match best {
            Some((_, top)) => score.is_nan() || score <= top,
            None => score.is_nan(),
        };
        if !beaten {
            best = Some((i, score));
        }
    }
    best
}

/// Loaded model plus its class labels
pub struct ImageClassifier {
    model: Box<dyn InferenceModel>,
    labels: Vec<String>,
    spec: InputSpec,
    filter: ResizeFilter,
}

impl std::fmt::Debug for ImageClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageClassifier")
            .field("labels", &self.labels.len())
            .field("spec", &self.spec)
            .field("filter", &self.filter)
            .finish()
    }
}

impl ImageClassifier {
    /// Loads an ONNX model and its label file
    ///
    /// # Errors
    ///
    /// `ModelLoad` or `LabelLoad`. Either one is fatal at startup.
    pub fn load(
        model_path: &Path,
        labels_path: &Path,
        filter: ResizeFilter,
    ) -> Result<Self, ClassifierError> {
        let labels = labels::load_labels(labels_path)?;
        let model = OnnxModel::load(model_path)?;
        Self::new(Box::new(model), labels, filter)
    }

    /// Builds a classifier from an already-loaded model
    ///
    /// Fails with `ModelLoad` when the model declares a class count that
    /// differs from the number of labels.
    pub fn new(
        model: Box<dyn InferenceModel>,
        labels: Vec<String>,
        filter: ResizeFilter,
    ) -> Result<Self, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::LabelLoad("no labels".to_string()));
        }

        if let Some(n) = model.output_len() {
            if n != labels.len() {
                return Err(ClassifierError::ModelLoad(format!(
                    "model has {} outputs but {} labels were loaded",
                    n,
                    labels.len()
                )));
            }
        }

        let spec = model.input_spec();
        tracing::info!(
            input_size = spec.size,
            classes = labels.len(),
            filter = ?filter,
            "Image classifier ready"
        );

        Ok(Self {
            model,
            labels,
            spec,
            filter,
        })
    }

    /// Classifies one uploaded image
    ///
    /// # Errors
    ///
    /// `Decode` for bytes that are not an image, `Inference` when the model
    /// fails or returns scores that do not map onto a label.
    pub fn classify(&self, bytes: &[u8]) -> Result<ClassificationResult, ClassifierError> {
        let input = preprocess::preprocess(bytes, &self.spec, self.filter)?;
        let scores = self.model.run(input)?;

        let (index, confidence) = select_top(&scores)
            .ok_or_else(|| ClassifierError::Inference("model returned no scores".to_string()))?;

        let label = self.labels.get(index).ok_or_else(|| {
            ClassifierError::Inference(format!(
                "top index {} has no label ({} labels)",
                index,
                self.labels.len()
            ))
        })?;

        tracing::debug!(label = %label, confidence, index, "Image classified");

        Ok(ClassificationResult {
            label: label.clone(),
            confidence,
        })
    }
}
