use std::fmt;
use thiserror::Error;

/// A present field whose value could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    pub field: String,
    pub reason: String,
}

/// Every problem found while validating one record.
///
/// Validation never stops at the first problem: the report lists all missing
/// fields and all present-but-unusable fields so the caller can fix a record
/// in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing: Vec<String>,
    pub invalid: Vec<InvalidField>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    /// Names of all offending fields, missing ones first.
    pub fn offending_fields(&self) -> Vec<&str> {
        self.missing
            .iter()
            .map(String::as_str)
            .chain(self.invalid.iter().map(|f| f.field.as_str()))
            .collect()
    }

    pub(crate) fn add_missing(&mut self, field: &str) {
        self.missing.push(field.to_string());
    }

    pub(crate) fn add_invalid(&mut self, field: &str, reason: impl Into<String>) {
        self.invalid.push(InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("Missing required fields: {:?}", self.missing));
        }
        if !self.invalid.is_empty() {
            let invalid: Vec<String> = self
                .invalid
                .iter()
                .map(|f| format!("{} ({})", f.field, f.reason))
                .collect();
            parts.push(format!("Invalid fields: {}", invalid.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Represents the different types of errors that can occur in the inference pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The record is missing required fields or carries unusable coordinates or stop time
    #[error("Validation error: {0}")]
    ValidationError(ValidationReport),
    /// A bundle component failed while running (scaler, classifier, vectorizer, cluster assigner)
    #[error("Model error: {0}")]
    ModelError(String),
    /// The artifact bundle does not satisfy its load contract
    #[error("Bundle error: {0}")]
    BundleError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Manifest error: {0}")]
    ManifestError(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}

#[cfg(feature = "onnx")]
impl From<ort::Error> for PipelineError {
    fn from(err: ort::Error) -> Self {
        PipelineError::ModelError(err.to_string())
    }
}
