use std::collections::{HashMap, HashSet};
use log::{info, warn};

use super::{ArtifactBundle, PerformanceMetrics};
use crate::components::{
    CategoricalEncoder, ClusterAssigner, FeatureScaler, ProbabilisticClassifier, TextVectorizer,
};
use crate::pipeline::schema::{field, ENCODED_FIELDS, SEVERITY_FIELDS};
use crate::pipeline::{FeatureSchema, PipelineError};

/// A builder for constructing an ArtifactBundle with a fluent interface.
///
/// All cross-component checks run in [`build`](Self::build), so components
/// can be supplied in any order.
#[derive(Default, Debug)]
pub struct ArtifactBundleBuilder {
    name: Option<String>,
    boolean_fields: Vec<String>,
    encoders: HashMap<String, Box<dyn CategoricalEncoder>>,
    text_vectorizer: Option<Box<dyn TextVectorizer>>,
    cluster_assigner: Option<Box<dyn ClusterAssigner>>,
    scaler: Option<Box<dyn FeatureScaler>>,
    classifier: Option<Box<dyn ProbabilisticClassifier>>,
    class_labels: Vec<String>,
    performance: PerformanceMetrics,
}

impl ArtifactBundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the ordered yes/no fields. The first seven must be the severity
    /// flags in canonical order.
    pub fn with_boolean_fields(mut self, fields: Vec<impl Into<String>>) -> Self {
        self.boolean_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Registers the encoder for one categorical field.
    ///
    /// # Errors
    /// - `BundleError` if the field already has an encoder or the vocabulary is empty
    pub fn add_encoder(
        mut self,
        field: impl Into<String>,
        encoder: impl CategoricalEncoder + 'static,
    ) -> Result<Self, PipelineError> {
        let field = field.into();
        if encoder.classes().is_empty() {
            return Err(PipelineError::BundleError(format!(
                "Encoder for '{}' has an empty vocabulary",
                field
            )));
        }
        if self.encoders.contains_key(&field) {
            return Err(PipelineError::BundleError(format!(
                "Encoder for '{}' already registered",
                field
            )));
        }
        self.encoders.insert(field, Box::new(encoder));
        Ok(self)
    }

    pub fn with_text_vectorizer(mut self, vectorizer: impl TextVectorizer + 'static) -> Self {
        self.text_vectorizer = Some(Box::new(vectorizer));
        self
    }

    pub fn with_cluster_assigner(mut self, assigner: impl ClusterAssigner + 'static) -> Self {
        self.cluster_assigner = Some(Box::new(assigner));
        self
    }

    pub fn with_scaler(mut self, scaler: impl FeatureScaler + 'static) -> Self {
        self.scaler = Some(Box::new(scaler));
        self
    }

    pub fn with_classifier(mut self, classifier: impl ProbabilisticClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub(crate) fn with_boxed_classifier(mut self, classifier: Box<dyn ProbabilisticClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub(crate) fn with_boxed_scaler(mut self, scaler: Box<dyn FeatureScaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_class_labels(mut self, labels: Vec<impl Into<String>>) -> Self {
        self.class_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_performance(mut self, performance: PerformanceMetrics) -> Self {
        self.performance = performance;
        self
    }

    fn validate_boolean_fields(fields: &[String]) -> Result<(), PipelineError> {
        let leading: Vec<&str> = fields.iter().take(SEVERITY_FIELDS.len()).map(String::as_str).collect();
        if leading != SEVERITY_FIELDS {
            return Err(PipelineError::BundleError(format!(
                "Boolean fields must start with {:?}, found {:?}",
                SEVERITY_FIELDS, leading
            )));
        }
        for required in [field::COMMERCIAL_LICENSE, field::COMMERCIAL_VEHICLE] {
            if !fields.iter().any(|f| f == required) {
                return Err(PipelineError::BundleError(format!(
                    "Boolean fields must include '{}'",
                    required
                )));
            }
        }
        Ok(())
    }

    fn validate_class_labels(labels: &[String]) -> Result<(), PipelineError> {
        if labels.is_empty() {
            return Err(PipelineError::BundleError("At least one class label is required".into()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(PipelineError::BundleError(format!(
                "Class label '{}' appears more than once",
                duplicate
            )));
        }
        Ok(())
    }

    /// Checks every component against the feature schema and returns the bundle.
    ///
    /// # Errors
    /// - `BundleError` if a component is missing, the boolean fields do not
    ///   start with the severity flags, an encoded field has no encoder, the
    ///   scaler or classifier width differs from the schema, or the classifier
    ///   class count differs from the class labels
    pub fn build(self) -> Result<ArtifactBundle, PipelineError> {
        let text_vectorizer = self.text_vectorizer
            .ok_or_else(|| PipelineError::BundleError("Text vectorizer not set".into()))?;
        let cluster_assigner = self.cluster_assigner
            .ok_or_else(|| PipelineError::BundleError("Location cluster assigner not set".into()))?;
        let scaler = self.scaler
            .ok_or_else(|| PipelineError::BundleError("Scaler not set".into()))?;
        let classifier = self.classifier
            .ok_or_else(|| PipelineError::BundleError("Classifier not set".into()))?;

        Self::validate_boolean_fields(&self.boolean_fields)?;
        Self::validate_class_labels(&self.class_labels)?;

        for field in ENCODED_FIELDS {
            if !self.encoders.contains_key(field) {
                return Err(PipelineError::BundleError(format!("No encoder for '{}'", field)));
            }
        }
        for field in self.encoders.keys() {
            if !ENCODED_FIELDS.contains(&field.as_str()) {
                warn!("Encoder for '{}' is not part of the feature schema and will be ignored", field);
            }
        }

        if cluster_assigner.num_clusters() == 0 {
            return Err(PipelineError::BundleError("Location model has no clusters".into()));
        }

        let schema = FeatureSchema::new(text_vectorizer.dimension());
        if scaler.num_features() != schema.width() {
            return Err(PipelineError::BundleError(format!(
                "Scaler expects {} features but the schema has {}",
                scaler.num_features(),
                schema.width()
            )));
        }
        if let Some(width) = classifier.num_features() {
            if width != schema.width() {
                return Err(PipelineError::BundleError(format!(
                    "Classifier expects {} features but the schema has {}",
                    width,
                    schema.width()
                )));
            }
        }
        if classifier.num_classes() != self.class_labels.len() {
            return Err(PipelineError::BundleError(format!(
                "Classifier produces {} probabilities for {} class labels",
                classifier.num_classes(),
                self.class_labels.len()
            )));
        }

        let name = self.name.unwrap_or_else(|| "unnamed".to_string());
        info!(
            "Bundle '{}' ready: {} features (schema v{}), {} classes",
            name,
            schema.width(),
            FeatureSchema::VERSION,
            self.class_labels.len()
        );

        Ok(ArtifactBundle {
            name,
            boolean_fields: self.boolean_fields,
            encoders: self.encoders,
            text_vectorizer,
            cluster_assigner,
            scaler,
            classifier,
            class_labels: self.class_labels,
            performance: self.performance,
            schema,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::components::{KMeansAssigner, LabelEncoder, LinearClassifier, MultiClass, StandardScaler, TfidfVectorizer};

    const WIDTH: usize = 21;

    fn boolean_fields() -> Vec<&'static str> {
        let mut fields = SEVERITY_FIELDS.to_vec();
        fields.extend([field::COMMERCIAL_LICENSE, field::COMMERCIAL_VEHICLE]);
        fields
    }

    fn vectorizer() -> TfidfVectorizer {
        let vocabulary: HashMap<String, usize> = [("speed".to_string(), 0), ("light".to_string(), 1)].into();
        TfidfVectorizer::new(vocabulary, vec![1.0, 1.0]).unwrap()
    }

    fn complete_builder(classes: usize) -> ArtifactBundleBuilder {
        let mut builder = ArtifactBundleBuilder::new()
            .with_name("test")
            .with_boolean_fields(boolean_fields())
            .with_text_vectorizer(vectorizer())
            .with_cluster_assigner(KMeansAssigner::new(vec![[39.0, -77.0]]).unwrap())
            .with_scaler(StandardScaler::identity(WIDTH))
            .with_classifier(
                LinearClassifier::new(vec![vec![0.0; WIDTH]; classes], vec![0.0; classes], MultiClass::Multinomial)
                    .unwrap(),
            )
            .with_class_labels(vec!["low", "mid", "high"]);
        for field in ENCODED_FIELDS {
            builder = builder.add_encoder(field, LabelEncoder::new(vec!["A", "B"]).unwrap()).unwrap();
        }
        builder
    }

    #[test]
    fn test_complete_bundle_builds() {
        let bundle = complete_builder(3).build().unwrap();
        assert_eq!(bundle.name(), "test");
        assert_eq!(bundle.schema().width(), WIDTH);
        assert_eq!(bundle.class_labels().len(), 3);
    }

    #[test]
    fn test_class_count_mismatch() {
        assert!(matches!(complete_builder(4).build(), Err(PipelineError::BundleError(_))));
    }

    #[test]
    fn test_duplicate_encoder() {
        let result = complete_builder(3).add_encoder(field::MAKE, LabelEncoder::new(vec!["X"]).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_boolean_field_order_enforced() {
        let mut fields = boolean_fields();
        fields.swap(0, 1);
        let result = complete_builder(3).with_boolean_fields(fields).build();
        assert!(matches!(result, Err(PipelineError::BundleError(_))));

        let result = complete_builder(3).with_boolean_fields(SEVERITY_FIELDS.to_vec()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_scaler_width_must_match_schema() {
        let result = complete_builder(3).with_scaler(StandardScaler::identity(WIDTH - 1)).build();
        assert!(matches!(result, Err(PipelineError::BundleError(_))));
    }

    #[test]
    fn test_missing_components() {
        assert!(ArtifactBundleBuilder::new().build().is_err());
        let result = complete_builder(3).with_class_labels(vec!["low", "low", "high"]).build();
        assert!(result.is_err());
    }
}
