use ndarray::Array1;

use super::{check_width, FeatureScaler};
use crate::pipeline::PipelineError;

/// Standardisation with fitted per-column mean and scale.
///
/// A zero scale is treated as one so constant training columns pass through
/// centred instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
    with_mean: bool,
    with_std: bool,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, PipelineError> {
        if mean.len() != scale.len() {
            return Err(PipelineError::BundleError(format!(
                "Scaler mean has {} columns but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::BundleError("Scaler statistics must be finite".into()));
        }
        let scale = scale.into_iter().map(|s| if s == 0.0 { 1.0 } else { s }).collect::<Vec<_>>();
        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
            with_mean: true,
            with_std: true,
        })
    }

    /// Pass-through scaler of the given width.
    pub fn identity(width: usize) -> Self {
        Self {
            mean: Array1::zeros(width),
            scale: Array1::ones(width),
            with_mean: false,
            with_std: false,
        }
    }

    pub fn with_centering(mut self, with_mean: bool, with_std: bool) -> Self {
        self.with_mean = with_mean;
        self.with_std = with_std;
        self
    }
}

impl FeatureScaler for StandardScaler {
    fn num_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, features: &Array1<f64>) -> Result<Array1<f64>, PipelineError> {
        check_width("Scaler", self.num_features(), features.len())?;
        let mut scaled = features.clone();
        if self.with_mean {
            scaled -= &self.mean;
        }
        if self.with_std {
            scaled /= &self.scale;
        }
        Ok(scaled)
    }
}

/// Range scaling: `x * scale + min` with the fitted per-column values.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    scale: Array1<f64>,
}

impl MinMaxScaler {
    pub fn new(min: Vec<f64>, scale: Vec<f64>) -> Result<Self, PipelineError> {
        if min.len() != scale.len() {
            return Err(PipelineError::BundleError(format!(
                "Scaler min has {} columns but scale has {}",
                min.len(),
                scale.len()
            )));
        }
        if min.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(PipelineError::BundleError("Scaler statistics must be finite".into()));
        }
        Ok(Self {
            min: Array1::from(min),
            scale: Array1::from(scale),
        })
    }
}

impl FeatureScaler for MinMaxScaler {
    fn num_features(&self) -> usize {
        self.min.len()
    }

    fn transform(&self, features: &Array1<f64>) -> Result<Array1<f64>, PipelineError> {
        check_width("Scaler", self.num_features(), features.len())?;
        Ok(features * &self.scale + &self.min)
    }
}
