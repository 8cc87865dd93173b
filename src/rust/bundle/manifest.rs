use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use super::{ArtifactBundle, PerformanceMetrics};
use crate::components::{
    FeatureScaler, KMeansAssigner, LabelEncoder, LinearClassifier, MinMaxScaler, MultiClass,
    ProbabilisticClassifier, StandardScaler, TermNorm, TextVectorizer, TfidfVectorizer,
};
use crate::pipeline::{FeatureSchema, PipelineError};

/// File name of the manifest inside a bundle directory.
pub const BUNDLE_MANIFEST: &str = "bundle.json";

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextVectorizerSpec {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: TermNorm,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub stop_words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationModelSpec {
    /// One `[latitude, longitude]` pair per cluster, indexed by cluster id.
    pub centroids: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerSpec {
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default = "default_true")]
        with_mean: bool,
        #[serde(default = "default_true")]
        with_std: bool,
    },
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Linear {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        #[serde(default)]
        multi_class: MultiClass,
    },
    /// Path is relative to the bundle directory.
    Onnx { path: String },
}

/// On-disk description of an artifact bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub boolean_columns: Vec<String>,
    pub label_encoders: BTreeMap<String, Vec<String>>,
    pub tfidf: TextVectorizerSpec,
    pub location_model: LocationModelSpec,
    pub scaler: ScalerSpec,
    pub model: ClassifierSpec,
    pub classes: Vec<String>,
    #[serde(default)]
    pub performance: PerformanceMetrics,
    /// SHA-256 of each file shipped next to the manifest, keyed by relative path.
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

impl BundleManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::BundleError(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Materialises the components and builds the bundle.
    ///
    /// `base_dir` resolves relative paths such as an ONNX classifier file.
    pub fn into_bundle(self, base_dir: &Path) -> Result<ArtifactBundle, PipelineError> {
        if let Some(version) = self.schema_version {
            if version != FeatureSchema::VERSION {
                return Err(PipelineError::BundleError(format!(
                    "Bundle '{}' targets feature schema v{}, this build reads v{}",
                    self.name,
                    version,
                    FeatureSchema::VERSION
                )));
            }
        }

        let vectorizer = Self::build_vectorizer(self.tfidf)?;
        let width = FeatureSchema::new(vectorizer.dimension()).width();
        let scaler = Self::build_scaler(self.scaler)?;
        let classifier = Self::build_classifier(self.model, base_dir, width, self.classes.len())?;

        let mut builder = ArtifactBundle::builder()
            .with_name(self.name)
            .with_boolean_fields(self.boolean_columns)
            .with_text_vectorizer(vectorizer)
            .with_cluster_assigner(KMeansAssigner::new(self.location_model.centroids)?)
            .with_boxed_scaler(scaler)
            .with_boxed_classifier(classifier)
            .with_class_labels(self.classes)
            .with_performance(self.performance);
        for (field, classes) in self.label_encoders {
            builder = builder.add_encoder(field, LabelEncoder::new(classes)?)?;
        }

        let bundle = builder.build()?;
        info!("Loaded bundle '{}' from {}", bundle.name(), base_dir.display());
        Ok(bundle)
    }

    fn build_vectorizer(tfidf: TextVectorizerSpec) -> Result<TfidfVectorizer, PipelineError> {
        let (min_n, max_n) = tfidf.ngram_range;
        Ok(TfidfVectorizer::new(tfidf.vocabulary, tfidf.idf)?
            .with_ngram_range(min_n, max_n)?
            .with_sublinear_tf(tfidf.sublinear_tf)
            .with_norm(tfidf.norm)
            .with_lowercase(tfidf.lowercase)
            .with_stop_words(tfidf.stop_words))
    }

    fn build_scaler(scaler: ScalerSpec) -> Result<Box<dyn FeatureScaler>, PipelineError> {
        let scaler: Box<dyn FeatureScaler> = match scaler {
            ScalerSpec::Standard { mean, scale, with_mean, with_std } => {
                Box::new(StandardScaler::new(mean, scale)?.with_centering(with_mean, with_std))
            }
            ScalerSpec::MinMax { min, scale } => Box::new(MinMaxScaler::new(min, scale)?),
        };
        Ok(scaler)
    }

    #[cfg_attr(not(feature = "onnx"), allow(unused_variables))]
    fn build_classifier(
        model: ClassifierSpec,
        base_dir: &Path,
        width: usize,
        num_classes: usize,
    ) -> Result<Box<dyn ProbabilisticClassifier>, PipelineError> {
        match model {
            ClassifierSpec::Linear { coef, intercept, multi_class } => {
                Ok(Box::new(LinearClassifier::new(coef, intercept, multi_class)?))
            }
            #[cfg(feature = "onnx")]
            ClassifierSpec::Onnx { path } => Ok(Box::new(crate::components::OnnxClassifier::from_file(
                base_dir.join(path),
                width,
                num_classes,
                &crate::RuntimeConfig::default(),
            )?)),
            #[cfg(not(feature = "onnx"))]
            ClassifierSpec::Onnx { path } => Err(PipelineError::BundleError(format!(
                "Classifier '{}' needs ONNX support; rebuild with the `onnx` feature",
                path
            ))),
        }
    }
}
