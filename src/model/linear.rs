use serde::Deserialize;

use super::ArtifactError;
use crate::inference::predictor::{Model, ModelError, RawOutput};

/// Exported ordinary-least-squares style regressor.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearRegression {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn check(&self) -> Result<(), ArtifactError> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(ArtifactError::CoefficientCount {
                coefficients: self.coefficients.len(),
                features: self.feature_names.len(),
            });
        }
        Ok(())
    }
}

impl Model for LinearRegression {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[f64]) -> Result<RawOutput, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.coefficients.len(),
                got: features.len(),
            });
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(RawOutput::Score(dot + self.intercept))
    }
}
