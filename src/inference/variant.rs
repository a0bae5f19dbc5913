use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::{FIXED_TOTAL_QUESTIONS, VARIABLE_TOTAL_QUESTIONS};
use crate::inference::features::{FeatureSchema, DIFFICULTY_SCHEMA, SCORING_SCHEMA};
use crate::inference::fields::{difficulty_table, scoring_table, FieldTable};

/// Which sibling deployment this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    FixedScoring,
    VariableScoring,
    Difficulty,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::FixedScoring => "fixed_scoring",
            Variant::VariableScoring => "variable_scoring",
            Variant::Difficulty => "difficulty",
        }
    }

    pub fn is_scoring(self) -> bool {
        !matches!(self, Variant::Difficulty)
    }

    pub fn schema(self) -> &'static FeatureSchema {
        match self {
            Variant::FixedScoring | Variant::VariableScoring => &SCORING_SCHEMA,
            Variant::Difficulty => &DIFFICULTY_SCHEMA,
        }
    }

    pub fn field_table(self, provincia_dificultad_required: bool) -> FieldTable {
        match self {
            Variant::FixedScoring | Variant::VariableScoring => {
                scoring_table(provincia_dificultad_required)
            }
            Variant::Difficulty => difficulty_table(),
        }
    }

    pub fn default_total_questions(self) -> u32 {
        match self {
            Variant::FixedScoring => FIXED_TOTAL_QUESTIONS,
            Variant::VariableScoring => VARIABLE_TOTAL_QUESTIONS,
            // Not used: the classifier output is never normalized.
            Variant::Difficulty => 1,
        }
    }

    pub fn default_provincia_dificultad_required(self) -> bool {
        matches!(self, Variant::VariableScoring)
    }

    pub fn default_model_path(self) -> &'static str {
        match self {
            Variant::FixedScoring | Variant::VariableScoring => "models/modelo_puntos.json",
            Variant::Difficulty => "models/modelo_dificultad.json",
        }
    }

    pub fn default_encoder_path(self) -> Option<&'static str> {
        match self {
            Variant::Difficulty => Some("models/label_encoder.json"),
            _ => None,
        }
    }

    /// Hard-coded request used by the self-test endpoint.
    pub fn self_test_request(self) -> Value {
        match self {
            Variant::FixedScoring | Variant::VariableScoring => json!({
                "tiempo_respuesta": 8.5,
                "provincia_dificultad": 3,
                "edad": 10,
                "vidas_usadas": 1,
                "es_correcto": 1
            }),
            Variant::Difficulty => json!({
                "edad": 10,
                "nro_ronda": 3,
                "vidas_usadas_ronda": 1,
                "racha_aciertos": 2,
                "dificultad_pregunta_anterior": "medio",
                "respuesta_correcta": 1,
                "tiempo_respuesta": 8.5
            }),
        }
    }

    pub fn example_request(self) -> Value {
        match self {
            Variant::FixedScoring | Variant::VariableScoring => json!({
                "tiempo_respuesta": 12.5,
                "provincia_dificultad": 3,
                "edad": 10,
                "vidas_usadas": 1,
                "es_correcto": 1
            }),
            Variant::Difficulty => json!({
                "edad": 10,
                "nro_ronda": 4,
                "vidas_usadas_ronda": 0,
                "racha_aciertos": 3,
                "dificultad_pregunta_anterior": "facil",
                "respuesta_correcta": 1,
                "tiempo_respuesta": 6.2
            }),
        }
    }

    pub fn example_response(self) -> Value {
        match self {
            Variant::FixedScoring | Variant::VariableScoring => json!({
                "puntos_estimados": 15,
                "puntos_raw": 156.78,
                "normalizado": true
            }),
            Variant::Difficulty => json!({
                "dificultad_siguiente_pregunta": "medio"
            }),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant '{0}', expected fixed, variable or difficulty")]
pub struct UnknownVariant(pub String);

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "fixed_scoring" => Ok(Variant::FixedScoring),
            "variable" | "variable_scoring" => Ok(Variant::VariableScoring),
            "difficulty" | "dificultad" => Ok(Variant::Difficulty),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}
