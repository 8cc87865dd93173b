use log::trace;
use serde::Serialize;

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::features::FeatureVector;
use crate::bundle::ArtifactBundle;
use crate::components::utils::argmax;

/// Probability the classifier assigned to one class label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f64,
}

/// Scales the engineered vector and queries the classifier.
///
/// Non-finite cells are imputed to zero before scaling. The returned
/// probabilities follow the bundle's class-label order; the predicted label is
/// the most probable class, the lowest index winning ties.
pub(crate) fn infer(
    bundle: &ArtifactBundle,
    config: &PipelineConfig,
    features: &FeatureVector,
) -> Result<(String, Vec<ClassProbability>), PipelineError> {
    let imputed = features.values().mapv(|v| if v.is_finite() { v } else { 0.0 });

    let scaled = bundle.scaler().transform(&imputed)?;
    if scaled.len() != imputed.len() {
        return Err(PipelineError::ModelError(format!(
            "Scaler returned {} columns for {} inputs",
            scaled.len(),
            imputed.len()
        )));
    }

    let labels = bundle.class_labels();
    let raw = bundle.classifier().predict_proba(&scaled)?;
    let probabilities = check_probabilities(raw, labels.len(), config.probability_tolerance)?;
    trace!("Class probabilities: {:?}", probabilities);

    let best = argmax(&probabilities)
        .ok_or_else(|| PipelineError::ModelError("Classifier returned no probabilities".into()))?;

    let distribution = labels
        .iter()
        .zip(probabilities)
        .map(|(label, probability)| ClassProbability {
            label: label.clone(),
            probability,
        })
        .collect();

    Ok((labels[best].clone(), distribution))
}

/// Rejects malformed classifier output and removes floating-point drift from the sum.
fn check_probabilities(raw: Vec<f64>, num_classes: usize, tolerance: f64) -> Result<Vec<f64>, PipelineError> {
    if raw.len() != num_classes {
        return Err(PipelineError::ModelError(format!(
            "Classifier returned {} probabilities for {} class labels",
            raw.len(),
            num_classes
        )));
    }
    if let Some(bad) = raw.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(PipelineError::ModelError(format!("Classifier returned probability {}", bad)));
    }

    let total: f64 = raw.iter().sum();
    if (total - 1.0).abs() > tolerance {
        return Err(PipelineError::ModelError(format!(
            "Classifier probabilities sum to {}, expected 1",
            total
        )));
    }
    Ok(raw.into_iter().map(|p| p / total).collect())
}
