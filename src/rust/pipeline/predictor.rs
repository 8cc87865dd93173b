use std::sync::Arc;
use log::debug;

use super::config::PipelineConfig;
use super::diagnostics::{diagnose, InferenceResult};
use super::error::PipelineError;
use super::features::{engineer, FeatureVector};
use super::inference::{infer, ClassProbability};
use super::record::RawRecord;
use super::schema::FeatureSchema;
use crate::bundle::ArtifactBundle;

/// Summary of what a predictor was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorInfo {
    pub bundle_name: String,
    pub class_labels: Vec<String>,
    pub num_features: usize,
    pub text_dimension: usize,
    pub schema_version: u32,
}

/// A thread-safe fine-category predictor over a shared artifact bundle.
///
/// # Thread Safety
///
/// The bundle sits behind an `Arc` and is never written after construction,
/// so a predictor can be cloned or shared across threads freely:
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use finecast::{ArtifactBundle, FinePredictor, RawRecord};
/// use std::sync::Arc;
/// use std::thread;
///
/// let bundle = Arc::new(ArtifactBundle::from_dir("bundles/maryland")?);
/// let predictor = Arc::new(FinePredictor::new(bundle));
///
/// let handle = {
///     let predictor = Arc::clone(&predictor);
///     thread::spawn(move || predictor.predict(&RawRecord::new()).is_err())
/// };
/// assert!(handle.join().unwrap());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FinePredictor {
    bundle: Arc<ArtifactBundle>,
    config: PipelineConfig,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<FinePredictor>();
    }
};

impl FinePredictor {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self {
            bundle,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns information about the predictor's bundle and feature layout
    pub fn info(&self) -> PredictorInfo {
        let schema = self.bundle.schema();
        PredictorInfo {
            bundle_name: self.bundle.name().to_string(),
            class_labels: self.bundle.class_labels().to_vec(),
            num_features: schema.width(),
            text_dimension: schema.text_dimension(),
            schema_version: FeatureSchema::VERSION,
        }
    }

    /// Predicts the fine category of one record.
    ///
    /// # Errors
    /// - `ValidationError` listing every missing required field and every
    ///   unusable coordinate or stop time
    /// - `ModelError` if a bundle component fails or returns malformed output
    pub fn predict(&self, record: &RawRecord) -> Result<InferenceResult, PipelineError> {
        let features = self.engineer(record)?;
        let (label, probabilities) = self.infer(&features)?;
        debug!("Predicted '{}' for record with {} fields", label, record.len());
        Ok(self.diagnose(record, &features, label, probabilities))
    }

    /// Feature-engineering stage on its own.
    pub fn engineer(&self, record: &RawRecord) -> Result<FeatureVector, PipelineError> {
        engineer(&self.bundle, &self.config, record)
    }

    /// Inference stage on an engineered vector.
    pub fn infer(&self, features: &FeatureVector) -> Result<(String, Vec<ClassProbability>), PipelineError> {
        infer(&self.bundle, &self.config, features)
    }

    /// Diagnostics stage; never fails.
    pub fn diagnose(
        &self,
        record: &RawRecord,
        features: &FeatureVector,
        predicted_label: String,
        class_probabilities: Vec<ClassProbability>,
    ) -> InferenceResult {
        diagnose(record, features, predicted_label, class_probabilities)
    }
}
