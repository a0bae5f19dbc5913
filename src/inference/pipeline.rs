use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::constants::{
    CODE_INTERNAL_ERROR, CODE_MODEL_NOT_LOADED, CODE_UNKNOWN_CATEGORY,
};
use crate::inference::codec::CodecError;
use crate::inference::features::{FeatureSchema, SchemaError};
use crate::inference::fields::FieldTable;
use crate::inference::normalizer::{normalize, round_cents};
use crate::inference::predictor::{ModelError, ModelHandle, RawOutput};
use crate::inference::validator::{validate, RawRequest, ValidationError};
use crate::inference::variant::Variant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub variant: Variant,
    pub total_questions: u32,
    pub provincia_dificultad_required: bool,
}

impl PipelineSettings {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            total_questions: variant.default_total_questions(),
            provincia_dificultad_required: variant.default_provincia_dificultad_required(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePrediction {
    pub puntos_estimados: i64,
    pub puntos_raw: f64,
    pub normalizado: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyPrediction {
    pub dificultad_siguiente_pregunta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionResult {
    Score(ScorePrediction),
    Difficulty(DifficultyPrediction),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("Modelo no disponible")]
    ModelNotLoaded,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    UnknownCategory(CodecError),
    #[error("{0}")]
    Internal(String),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ModelNotLoaded => CODE_MODEL_NOT_LOADED,
            PipelineError::Invalid(e) => e.code(),
            PipelineError::UnknownCategory(_) => CODE_UNKNOWN_CATEGORY,
            PipelineError::Internal(_) => CODE_INTERNAL_ERROR,
        }
    }

    /// Client-caused failures; everything else is a server-side condition.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Invalid(_) | PipelineError::UnknownCategory(_)
        )
    }
}

impl From<CodecError> for PipelineError {
    fn from(value: CodecError) -> Self {
        match value {
            CodecError::UnknownCategory { .. } => PipelineError::UnknownCategory(value),
            other => PipelineError::Internal(other.to_string()),
        }
    }
}

impl From<ModelError> for PipelineError {
    fn from(value: ModelError) -> Self {
        PipelineError::Internal(value.to_string())
    }
}

impl From<SchemaError> for PipelineError {
    fn from(value: SchemaError) -> Self {
        PipelineError::Internal(value.to_string())
    }
}

/// Validation, feature assembly, encoding, inference and normalization for
/// one deployed variant.
#[derive(Debug)]
pub struct Pipeline {
    settings: PipelineSettings,
    table: FieldTable,
    schema: &'static FeatureSchema,
    model: Option<Arc<ModelHandle>>,
}

impl Pipeline {
    /// Builds the pipeline and runs the schema self-check. An absent model is
    /// accepted; a model that does not fit the variant's schema is not.
    pub fn new(settings: PipelineSettings, model: Option<ModelHandle>) -> Result<Self, SchemaError> {
        let variant = settings.variant;
        if variant.is_scoring() && settings.total_questions == 0 {
            return Err(SchemaError::ZeroTotalQuestions);
        }

        let table = variant.field_table(settings.provincia_dificultad_required);
        let schema = variant.schema();
        schema.check_fields(&table)?;

        if let Some(handle) = &model {
            schema.check_model(handle.model().feature_names())?;
            check_model_kind(variant, handle)?;
        }

        Ok(Self {
            settings,
            table,
            schema,
            model: model.map(Arc::new),
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn variant(&self) -> Variant {
        self.settings.variant
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict(&self, raw: &RawRequest) -> Result<PredictionResult, PipelineError> {
        let Some(handle) = self.model.as_deref() else {
            return Err(PipelineError::ModelNotLoaded);
        };
        tracing::debug!(payload = ?raw, "Prediction request received");

        let input = validate(&self.table, raw)?;
        for field in input.defaulted() {
            tracing::info!(field, "Field not sent, using default value");
        }

        let row = self.schema.assemble(&input)?;
        let vector = row.encode(handle.codec())?;
        tracing::debug!(features = ?vector.values(), "Features assembled");

        match (handle.infer(&vector)?, self.settings.variant.is_scoring()) {
            (RawOutput::Score(raw_score), true) => {
                let puntos = normalize(raw_score, self.settings.total_questions);
                tracing::info!(raw = raw_score, normalized = puntos, "Score predicted");
                Ok(PredictionResult::Score(ScorePrediction {
                    puntos_estimados: puntos,
                    puntos_raw: round_cents(raw_score),
                    normalizado: true,
                }))
            }
            (RawOutput::ClassCode(code), false) => {
                let codec = handle.codec().ok_or(CodecError::NoCodec("output"))?;
                let label = codec.decode(code)?;
                tracing::info!(code, label, "Difficulty predicted");
                Ok(PredictionResult::Difficulty(DifficultyPrediction {
                    dificultad_siguiente_pregunta: label.to_string(),
                }))
            }
            (output, _) => Err(PipelineError::Internal(format!(
                "salida de modelo inesperada para {}: {output:?}",
                self.settings.variant
            ))),
        }
    }
}

fn check_model_kind(variant: Variant, handle: &ModelHandle) -> Result<(), SchemaError> {
    match (variant.is_scoring(), handle.model().class_count()) {
        (true, None) => Ok(()),
        (true, Some(_)) => Err(SchemaError::WrongModelKind {
            variant: variant.as_str(),
            found: "classifier",
        }),
        (false, None) => Err(SchemaError::WrongModelKind {
            variant: variant.as_str(),
            found: "regression",
        }),
        (false, Some(classes)) => {
            let codec = handle.codec().ok_or(SchemaError::MissingCodec)?;
            if classes == codec.len() {
                Ok(())
            } else {
                Err(SchemaError::ClassCount {
                    model: classes,
                    codec: codec.len(),
                })
            }
        }
    }
}
