//! The immutable artifact bundle consumed by the pipeline.
//!
//! A bundle is assembled once, either in code through [`ArtifactBundleBuilder`]
//! or from a `bundle.json` manifest, and checked against the feature schema
//! before it can be used. It is never mutated afterwards, so one bundle can be
//! shared behind an `Arc` by any number of concurrent predictions.

use std::collections::HashMap;
use std::path::Path;

use crate::components::{
    CategoricalEncoder, ClusterAssigner, FeatureScaler, ProbabilisticClassifier, TextVectorizer,
};
use crate::pipeline::{FeatureSchema, PipelineError};

mod builder;
mod manifest;
mod metrics;

pub use builder::ArtifactBundleBuilder;
pub use manifest::{
    BundleManifest, ClassifierSpec, LocationModelSpec, ScalerSpec, TextVectorizerSpec, BUNDLE_MANIFEST,
};
pub use metrics::{AverageMetrics, MetricsSummary, PerformanceMetrics};

#[derive(Debug)]
pub struct ArtifactBundle {
    pub(crate) name: String,
    pub(crate) boolean_fields: Vec<String>,
    pub(crate) encoders: HashMap<String, Box<dyn CategoricalEncoder>>,
    pub(crate) text_vectorizer: Box<dyn TextVectorizer>,
    pub(crate) cluster_assigner: Box<dyn ClusterAssigner>,
    pub(crate) scaler: Box<dyn FeatureScaler>,
    pub(crate) classifier: Box<dyn ProbabilisticClassifier>,
    pub(crate) class_labels: Vec<String>,
    pub(crate) performance: PerformanceMetrics,
    pub(crate) schema: FeatureSchema,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ArtifactBundle>();
    }
};

impl ArtifactBundle {
    /// Creates a new ArtifactBundleBuilder for fluent construction
    pub fn builder() -> ArtifactBundleBuilder {
        ArtifactBundleBuilder::new()
    }

    /// Loads a bundle from a directory holding `bundle.json` and any files it references.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let dir = dir.as_ref();
        let manifest = BundleManifest::from_file(dir.join(BUNDLE_MANIFEST))?;
        manifest.into_bundle(dir)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn boolean_fields(&self) -> &[String] {
        &self.boolean_fields
    }

    pub fn encoder(&self, field: &str) -> Option<&dyn CategoricalEncoder> {
        self.encoders.get(field).map(|e| e.as_ref())
    }

    pub fn encoded_fields(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn text_vectorizer(&self) -> &dyn TextVectorizer {
        self.text_vectorizer.as_ref()
    }

    pub fn cluster_assigner(&self) -> &dyn ClusterAssigner {
        self.cluster_assigner.as_ref()
    }

    pub fn scaler(&self) -> &dyn FeatureScaler {
        self.scaler.as_ref()
    }

    pub fn classifier(&self) -> &dyn ProbabilisticClassifier {
        self.classifier.as_ref()
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }
}
