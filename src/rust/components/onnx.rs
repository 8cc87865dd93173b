use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use log::info;
use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::value::Tensor;

use super::{check_width, ProbabilisticClassifier};
use crate::pipeline::PipelineError;
use crate::runtime::{create_session_builder, RuntimeConfig};

const PROBABILITY_OUTPUTS: [&str; 2] = ["probabilities", "output_probability"];

/// Classifier exported to ONNX.
///
/// The model takes one float input of shape `[1, num_features]` and must
/// expose class probabilities as a float tensor of shape `[1, num_classes]`
/// (for converted scikit-learn models, export without the zipmap operator).
/// The output is picked by name when possible, otherwise the last output is used.
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Arc<Session>,
    input_name: String,
    probability_output: String,
    num_features: usize,
    num_classes: usize,
}

impl OnnxClassifier {
    pub fn from_file(
        model_path: impl AsRef<Path>,
        num_features: usize,
        num_classes: usize,
        config: &RuntimeConfig,
    ) -> Result<Self, PipelineError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(PipelineError::BundleError(format!(
                "Classifier model not found: {}",
                model_path.display()
            )));
        }

        let session = create_session_builder(config)?.commit_from_file(model_path)?;
        let (input_name, probability_output) = Self::validate_model(&session)?;
        info!(
            "Loaded ONNX classifier {} (input '{}', output '{}')",
            model_path.display(),
            input_name,
            probability_output
        );

        Ok(Self {
            session: Arc::new(session),
            input_name,
            probability_output,
            num_features,
            num_classes,
        })
    }

    fn validate_model(session: &Session) -> Result<(String, String), PipelineError> {
        let input = session.inputs.first().ok_or_else(|| {
            PipelineError::BundleError("Classifier model must have one float input".to_string())
        })?;

        let output = session
            .outputs
            .iter()
            .find(|o| PROBABILITY_OUTPUTS.contains(&o.name.as_str()))
            .or_else(|| session.outputs.last())
            .ok_or_else(|| {
                PipelineError::BundleError("Classifier model must have a probability output".to_string())
            })?;

        Ok((input.name.clone(), output.name.clone()))
    }
}

impl ProbabilisticClassifier for OnnxClassifier {
    fn num_features(&self) -> Option<usize> {
        Some(self.num_features)
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn predict_proba(&self, features: &Array1<f64>) -> Result<Vec<f64>, PipelineError> {
        check_width("Classifier", self.num_features, features.len())?;

        let input_array = Array2::from_shape_vec(
            (1, features.len()),
            features.iter().map(|&x| x as f32).collect(),
        )
        .map_err(|e| PipelineError::ModelError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input)
                .map_err(|e| PipelineError::ModelError(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| PipelineError::ModelError(format!("Failed to run classifier: {}", e)))?;
        let probabilities = outputs[self.probability_output.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::ModelError(format!("Failed to extract probabilities: {}", e)))?;

        let probabilities: Vec<f64> = probabilities.iter().map(|&p| p as f64).collect();
        if probabilities.len() != self.num_classes {
            return Err(PipelineError::ModelError(format!(
                "Classifier returned {} probabilities for {} classes",
                probabilities.len(),
                self.num_classes
            )));
        }
        Ok(probabilities)
    }
}
