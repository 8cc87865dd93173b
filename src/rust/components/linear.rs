use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::utils::{sigmoid, softmax};
use super::{check_width, ProbabilisticClassifier};
use crate::pipeline::PipelineError;

/// How per-class decision scores become probabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiClass {
    /// Softmax over all class scores
    #[default]
    Multinomial,
    /// Independent sigmoids, renormalised to sum to one
    OneVsRest,
}

/// Logistic regression over the scaled feature vector.
///
/// With a single coefficient row the model is binary: the row scores the
/// second class and the first class gets the complement.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    coef: Array2<f64>,
    intercept: Array1<f64>,
    multi_class: MultiClass,
}

impl LinearClassifier {
    pub fn new(coef: Vec<Vec<f64>>, intercept: Vec<f64>, multi_class: MultiClass) -> Result<Self, PipelineError> {
        let rows = coef.len();
        let width = coef.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || width == 0 {
            return Err(PipelineError::BundleError("Classifier has no coefficients".into()));
        }
        if coef.iter().any(|row| row.len() != width) {
            return Err(PipelineError::BundleError("Classifier coefficient rows differ in width".into()));
        }
        if intercept.len() != rows {
            return Err(PipelineError::BundleError(format!(
                "Classifier has {} coefficient rows but {} intercepts",
                rows,
                intercept.len()
            )));
        }

        let flat: Vec<f64> = coef.into_iter().flatten().collect();
        if flat.iter().chain(intercept.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::BundleError("Classifier weights must be finite".into()));
        }
        let coef = Array2::from_shape_vec((rows, width), flat)
            .map_err(|e| PipelineError::BundleError(format!("Invalid coefficient matrix: {}", e)))?;

        Ok(Self {
            coef,
            intercept: Array1::from(intercept),
            multi_class,
        })
    }

    fn decision_function(&self, features: &Array1<f64>) -> Array1<f64> {
        self.coef.dot(features) + &self.intercept
    }
}

impl ProbabilisticClassifier for LinearClassifier {
    fn num_features(&self) -> Option<usize> {
        Some(self.coef.ncols())
    }

    fn num_classes(&self) -> usize {
        match self.coef.nrows() {
            1 => 2,
            n => n,
        }
    }

    fn predict_proba(&self, features: &Array1<f64>) -> Result<Vec<f64>, PipelineError> {
        check_width("Classifier", self.coef.ncols(), features.len())?;
        let scores = self.decision_function(features);

        if scores.len() == 1 {
            let positive = sigmoid(scores[0]);
            return Ok(vec![1.0 - positive, positive]);
        }

        let probabilities = match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::OneVsRest => {
                let raw = scores.mapv(sigmoid);
                let total = raw.sum();
                raw / total
            }
        };
        Ok(probabilities.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_multinomial_prefers_highest_score() {
        let classifier = LinearClassifier::new(
            vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 2.0]],
            vec![0.5, 0.0, 0.0],
            MultiClass::Multinomial,
        )
        .unwrap();
        assert_eq!(classifier.num_classes(), 3);

        let p = classifier.predict_proba(&array![0.0, 1.0]).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[2] > p[0] && p[0] > p[1]);
    }

    #[test]
    fn test_binary_single_row() {
        let classifier = LinearClassifier::new(vec![vec![1.0]], vec![0.0], MultiClass::default()).unwrap();
        assert_eq!(classifier.num_classes(), 2);
        let p = classifier.predict_proba(&array![0.0]).unwrap();
        assert_eq!(p, vec![0.5, 0.5]);
    }

    #[test]
    fn test_one_vs_rest_is_normalised() {
        let classifier = LinearClassifier::new(
            vec![vec![1.0], vec![-1.0], vec![0.0]],
            vec![0.0, 0.0, 0.0],
            MultiClass::OneVsRest,
        )
        .unwrap();
        let p = classifier.predict_proba(&array![3.0]).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[0] > p[2] && p[2] > p[1]);
    }

    #[test]
    fn test_shape_errors() {
        assert!(LinearClassifier::new(vec![], vec![], MultiClass::default()).is_err());
        assert!(LinearClassifier::new(vec![vec![1.0], vec![1.0, 2.0]], vec![0.0, 0.0], MultiClass::default()).is_err());
        assert!(LinearClassifier::new(vec![vec![1.0]], vec![0.0, 1.0], MultiClass::default()).is_err());

        let classifier = LinearClassifier::new(vec![vec![1.0, 1.0]], vec![0.0], MultiClass::default()).unwrap();
        assert!(matches!(classifier.predict_proba(&array![1.0]), Err(PipelineError::ModelError(_))));
    }
}
