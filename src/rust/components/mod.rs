//! Pre-trained components of an artifact bundle.
//!
//! Each stage of the pipeline talks to its component through one of the
//! traits below. The concrete adapters in this module reproduce the fitted
//! transforms numerically; alternatives (for instance an ONNX-exported
//! classifier) plug in behind the same trait.

use std::fmt::Debug;
use ndarray::Array1;

use crate::pipeline::PipelineError;

mod cluster;
mod encoder;
mod linear;
mod scaler;
pub(crate) mod utils;
mod vectorizer;
#[cfg(feature = "onnx")]
mod onnx;

pub use cluster::KMeansAssigner;
pub use encoder::LabelEncoder;
pub use linear::{LinearClassifier, MultiClass};
pub use scaler::{MinMaxScaler, StandardScaler};
pub use vectorizer::{TermNorm, TfidfVectorizer};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

/// Maps a category string to its zero-based code in a fixed vocabulary.
pub trait CategoricalEncoder: Debug + Send + Sync {
    /// The vocabulary, in code order.
    fn classes(&self) -> &[String];

    /// Code of `value`, or `None` when the value was never seen in training.
    fn encode(&self, value: &str) -> Option<usize>;

    /// Code of `value`, falling back to the code of the first vocabulary entry.
    fn encode_or_default(&self, value: &str) -> usize {
        match self.encode(value) {
            Some(code) => code,
            None => {
                log::debug!("Unseen category {:?}, using code of {:?}", value, self.classes().first());
                0
            }
        }
    }
}

/// Turns free text into a fixed-length weighted bag of terms.
pub trait TextVectorizer: Debug + Send + Sync {
    fn dimension(&self) -> usize;

    fn transform(&self, text: &str) -> Result<Array1<f64>, PipelineError>;
}

/// Assigns a coordinate pair to one of a fixed set of location clusters.
pub trait ClusterAssigner: Debug + Send + Sync {
    fn num_clusters(&self) -> usize;

    fn assign(&self, latitude: f64, longitude: f64) -> Result<usize, PipelineError>;
}

/// Fitted per-column transform applied to the whole feature vector.
pub trait FeatureScaler: Debug + Send + Sync {
    fn num_features(&self) -> usize;

    fn transform(&self, features: &Array1<f64>) -> Result<Array1<f64>, PipelineError>;
}

/// Produces one probability per class for a scaled feature vector.
pub trait ProbabilisticClassifier: Debug + Send + Sync {
    /// Expected input width, when the classifier knows it.
    fn num_features(&self) -> Option<usize>;

    fn num_classes(&self) -> usize;

    fn predict_proba(&self, features: &Array1<f64>) -> Result<Vec<f64>, PipelineError>;
}

pub(crate) fn check_width(component: &str, expected: usize, actual: usize) -> Result<(), PipelineError> {
    if expected != actual {
        return Err(PipelineError::ModelError(format!(
            "{} expects {} features, got {}",
            component, expected, actual
        )));
    }
    Ok(())
}
