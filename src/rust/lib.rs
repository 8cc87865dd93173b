//! Fine-category inference for traffic-stop records.
//!
//! A raw stop record goes through three synchronous stages against an
//! immutable, pre-trained [`ArtifactBundle`]:
//!
//! 1. feature engineering: validation, yes/no normalisation, stop-hour
//!    bucketing, location clustering, severity aggregation, categorical
//!    encoding, vehicle age and TF-IDF text features, assembled in
//!    [`FeatureSchema`] column order
//! 2. inference: imputation, scaling and class probabilities
//! 3. diagnostics: confidence, severity risk and risk factors
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use finecast::{ArtifactBundle, FinePredictor, RawRecord};
//! use std::sync::Arc;
//!
//! let bundle = Arc::new(ArtifactBundle::from_dir("bundles/maryland")?);
//! let predictor = FinePredictor::new(bundle);
//!
//! let record = RawRecord::from_json_str(&std::fs::read_to_string("record.json")?)?;
//! let result = predictor.predict(&record)?;
//! println!("Predicted category: {} ({:.1}%)", result.predicted_category, result.confidence * 100.0);
//! for factor in &result.risk_factors {
//!     println!("  risk factor: {}", factor);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The bundle is never mutated after it is built. Share it with `Arc` and
//! call [`FinePredictor::predict`] from as many threads as needed.

pub mod artifact_store;
pub mod bundle;
pub mod components;
pub mod pipeline;
#[cfg(feature = "onnx")]
mod runtime;

pub use artifact_store::{ArtifactStore, BundleSource, StoreError};
pub use bundle::{ArtifactBundle, ArtifactBundleBuilder, BundleManifest, PerformanceMetrics};
pub use pipeline::{
    ClassProbability, FeatureSchema, FeatureVector, FinePredictor, InferenceResult, PipelineConfig,
    PipelineError, PredictorInfo, RawRecord, RawValue, TimePeriod, ValidationReport,
};
#[cfg(feature = "onnx")]
pub use runtime::{create_session_builder, OptimizationLevel, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
