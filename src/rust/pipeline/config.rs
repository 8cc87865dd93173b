use chrono::{Datelike, Local};

/// Per-predictor settings that are not part of the artifact bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Year used for vehicle age. `None` reads the local clock on every call.
    pub current_year: Option<i32>,
    /// Largest distance from 1.0 a classifier's probability sum may show
    /// before the output is rejected as corrupt.
    pub probability_tolerance: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            current_year: None,
            probability_tolerance: 1e-4,
        }
    }
}

impl PipelineConfig {
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn with_probability_tolerance(mut self, tolerance: f64) -> Self {
        self.probability_tolerance = tolerance;
        self
    }

    pub fn resolve_current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Local::now().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_year() {
        let config = PipelineConfig::default().with_current_year(2025);
        assert_eq!(config.resolve_current_year(), 2025);
    }

    #[test]
    fn test_clock_year() {
        let config = PipelineConfig::default();
        assert_eq!(config.resolve_current_year(), Local::now().year());
    }
}
