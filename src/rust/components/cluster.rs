use ndarray::{Array2, ArrayView1};

use super::ClusterAssigner;
use crate::pipeline::PipelineError;

/// Nearest-centroid assignment over (latitude, longitude) pairs.
#[derive(Debug, Clone)]
pub struct KMeansAssigner {
    centroids: Array2<f64>,
}

impl KMeansAssigner {
    /// `centroids` holds one `[latitude, longitude]` row per cluster; the row
    /// index is the cluster id.
    pub fn new(centroids: Vec<[f64; 2]>) -> Result<Self, PipelineError> {
        if centroids.is_empty() {
            return Err(PipelineError::BundleError("Location model has no centroids".into()));
        }
        if centroids.iter().flatten().any(|c| !c.is_finite()) {
            return Err(PipelineError::BundleError("Location model has non-finite centroids".into()));
        }
        let rows = centroids.len();
        let flat: Vec<f64> = centroids.into_iter().flatten().collect();
        let centroids = Array2::from_shape_vec((rows, 2), flat)
            .map_err(|e| PipelineError::BundleError(format!("Invalid centroid matrix: {}", e)))?;
        Ok(Self { centroids })
    }

    pub fn centroid(&self, cluster: usize) -> Option<ArrayView1<'_, f64>> {
        (cluster < self.centroids.nrows()).then(|| self.centroids.row(cluster))
    }
}

impl ClusterAssigner for KMeansAssigner {
    fn num_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    fn assign(&self, latitude: f64, longitude: f64) -> Result<usize, PipelineError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(PipelineError::ModelError(format!(
                "Cannot assign cluster for ({}, {})",
                latitude, longitude
            )));
        }

        let mut best = (0, f64::INFINITY);
        for (cluster, centroid) in self.centroids.rows().into_iter().enumerate() {
            let d_lat = latitude - centroid[0];
            let d_lon = longitude - centroid[1];
            let distance = d_lat * d_lat + d_lon * d_lon;
            if distance < best.1 {
                best = (cluster, distance);
            }
        }
        Ok(best.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maryland() -> KMeansAssigner {
        KMeansAssigner::new(vec![[39.0, -77.1], [39.15, -77.2], [38.98, -76.95]]).unwrap()
    }

    #[test]
    fn test_nearest_centroid() {
        let assigner = maryland();
        assert_eq!(assigner.num_clusters(), 3);
        assert_eq!(assigner.assign(39.01, -77.09).unwrap(), 0);
        assert_eq!(assigner.assign(39.2, -77.25).unwrap(), 1);
        assert_eq!(assigner.assign(38.9, -76.9).unwrap(), 2);
    }

    #[test]
    fn test_equidistant_point_takes_lowest_id() {
        let assigner = KMeansAssigner::new(vec![[0.0, -1.0], [0.0, 1.0]]).unwrap();
        assert_eq!(assigner.assign(0.0, 0.0).unwrap(), 0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(KMeansAssigner::new(vec![]).is_err());
        assert!(KMeansAssigner::new(vec![[f64::NAN, 0.0]]).is_err());
        assert!(maryland().assign(f64::NAN, -77.0).is_err());
        assert!(maryland().centroid(3).is_none());
    }
}
