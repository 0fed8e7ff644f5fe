//! Inference backends
//!
//! [`InferenceModel`] is the seam between the classifier pipeline and the
//! runtime that executes the graph. [`OnnxModel`] runs a single-input,
//! single-output ONNX graph with ONNX Runtime.

use super::error::ClassifierError;
use super::preprocess::InputSpec;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use std::path::Path;
use std::sync::Mutex;

/// A loaded classification graph
pub trait InferenceModel: Send + Sync {
    /// Declared shape of the image input
    fn input_spec(&self) -> InputSpec;

    /// Number of classes, when the graph declares it statically
    fn output_len(&self) -> Option<usize> {
        None
    }

    /// Runs one forward pass and returns the flattened output scores
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

/// ONNX Runtime backed model
pub struct OnnxModel {
    spec: InputSpec,
    output_len: Option<usize>,
    // ort needs exclusive access to the session for each run
    session: Mutex<Session>,
}

impl OnnxModel {
    /// Loads the graph and reads its declared input shape
    ///
    /// # Errors
    ///
    /// `ModelLoad` if the file is missing, is not a valid graph, or does not
    /// have exactly one static square image input.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        if !path.exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading ONNX model");

        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.with_intra_threads(2))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;

        if session.inputs.len() != 1 || session.outputs.len() != 1 {
            return Err(ClassifierError::ModelLoad(format!(
                "expected one input and one output, found {} and {}",
                session.inputs.len(),
                session.outputs.len()
            )));
        }

        let input_shape = tensor_shape(&session.inputs[0].input_type).ok_or_else(|| {
            ClassifierError::ModelLoad("model input is not a tensor".to_string())
        })?;
        let spec = InputSpec::from_shape(&input_shape)?;

        let output_len = tensor_shape(&session.outputs[0].output_type)
            .and_then(|shape| shape.last().copied())
            .filter(|n| *n > 0)
            .map(|n| n as usize);

        tracing::info!(
            input_size = spec.size,
            layout = ?spec.layout,
            output_len = ?output_len,
            "ONNX model loaded"
        );

        Ok(Self {
            spec,
            output_len,
            session: Mutex::new(session),
        })
    }
}

fn tensor_shape(value_type: &ValueType) -> Option<Vec<i64>> {
    match value_type {
        ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
        _ => None,
    }
}

impl InferenceModel for OnnxModel {
    fn input_spec(&self) -> InputSpec {
        self.spec
    }

    fn output_len(&self) -> Option<usize> {
        self.output_len
    }

    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let tensor =
            Tensor::from_array(input).map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("session lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        Ok(scores.to_vec())
    }
}
