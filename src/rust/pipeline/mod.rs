//! Record-to-category inference: feature engineering, inference and diagnostics.

mod config;
mod diagnostics;
mod error;
mod features;
mod inference;
mod predictor;
mod record;
pub mod schema;

pub use config::PipelineConfig;
pub use diagnostics::InferenceResult;
pub use error::{InvalidField, PipelineError, ValidationReport};
pub use features::{parse_stop_hour, FeatureVector, TimePeriod};
pub use inference::ClassProbability;
pub use predictor::{FinePredictor, PredictorInfo};
pub use record::{RawRecord, RawValue};
pub use schema::FeatureSchema;
