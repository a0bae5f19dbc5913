use std::fmt;

use thiserror::Error;

use crate::inference::codec::LabelCodec;
use crate::inference::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("vector de características con {got} columnas, el modelo espera {expected}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("el modelo produjo un valor no finito")]
    NonFinite,
    #[error("artefacto de modelo corrupto: {0}")]
    Corrupt(String),
}

/// Raw model output before normalization or decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawOutput {
    Score(f64),
    ClassCode(usize),
}

/// An opaque prediction function trained elsewhere.
pub trait Model: Send + Sync + fmt::Debug {
    /// Column names in the order the model was trained on.
    fn feature_names(&self) -> &[String];

    fn predict(&self, features: &[f64]) -> Result<RawOutput, ModelError>;

    /// Number of class codes a classifier can emit; `None` for regressors.
    fn class_count(&self) -> Option<usize> {
        None
    }
}

/// Loaded model plus its optional label codec, built once at startup and
/// shared read-only by every request.
#[derive(Debug)]
pub struct ModelHandle {
    model: Box<dyn Model>,
    codec: Option<LabelCodec>,
}

impl ModelHandle {
    pub fn new(model: impl Model + 'static) -> Self {
        Self::from_boxed(Box::new(model))
    }

    pub fn from_boxed(model: Box<dyn Model>) -> Self {
        Self {
            model,
            codec: None,
        }
    }

    pub fn with_codec(mut self, codec: LabelCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn codec(&self) -> Option<&LabelCodec> {
        self.codec.as_ref()
    }

    pub fn infer(&self, vector: &FeatureVector) -> Result<RawOutput, ModelError> {
        let expected = self.model.feature_names().len();
        if vector.len() != expected {
            return Err(ModelError::ShapeMismatch {
                expected,
                got: vector.len(),
            });
        }
        let output = self.model.predict(vector.values())?;
        if let RawOutput::Score(value) = output {
            if !value.is_finite() {
                return Err(ModelError::NonFinite);
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::inference::features::SCORING_SCHEMA;
    use crate::inference::fields::scoring_table;
    use crate::inference::validator::validate;

    #[derive(Debug)]
    struct Constant {
        names: Vec<String>,
        value: f64,
    }

    impl Model for Constant {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn predict(&self, _features: &[f64]) -> Result<RawOutput, ModelError> {
            Ok(RawOutput::Score(self.value))
        }
    }

    fn vector() -> FeatureVector {
        let raw = json!({
            "tiempo_respuesta": 1.0,
            "edad": 10,
            "vidas_usadas": 0,
            "es_correcto": 1
        });
        let input = validate(&scoring_table(false), raw.as_object().unwrap()).unwrap();
        SCORING_SCHEMA
            .assemble(&input)
            .unwrap()
            .encode(None)
            .unwrap()
    }

    fn names(n: usize) -> Vec<String> {
        SCORING_SCHEMA.names()[..n]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn infers_through_handle() {
        let handle = ModelHandle::new(Constant {
            names: names(5),
            value: 42.0,
        });
        assert_eq!(handle.infer(&vector()).unwrap(), RawOutput::Score(42.0));
        assert!(handle.codec().is_none());
    }

    #[test]
    fn rejects_shape_mismatch() {
        let handle = ModelHandle::new(Constant {
            names: names(4),
            value: 1.0,
        });
        assert_eq!(
            handle.infer(&vector()).unwrap_err(),
            ModelError::ShapeMismatch {
                expected: 4,
                got: 5
            }
        );
    }

    #[test]
    fn rejects_non_finite_scores() {
        let handle = ModelHandle::new(Constant {
            names: names(5),
            value: f64::INFINITY,
        });
        assert_eq!(handle.infer(&vector()).unwrap_err(), ModelError::NonFinite);
    }
}
