//! Column layouts the trained models expect, and assembly of validated
//! input into those layouts.

use thiserror::Error;

use crate::inference::codec::{CodecError, LabelCodec};
use crate::inference::fields::{FieldKind, FieldTable, FieldValue};
use crate::inference::validator::ValidatedInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn numeric(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Numeric,
    }
}

const fn categorical(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Categorical,
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("column '{column}' is declared by {count} field specs, expected exactly one")]
    FieldMapping { column: &'static str, count: usize },
    #[error("column '{column}' has kind {column_kind:?} but its field is {field_kind:?}")]
    KindMismatch {
        column: &'static str,
        column_kind: ColumnKind,
        field_kind: FieldKind,
    },
    #[error("optional column '{0}' has no default value")]
    NoDefault(&'static str),
    #[error("model expects columns [{}] but schema declares [{}]", .model.join(", "), .schema.join(", "))]
    ModelColumns {
        model: Vec<String>,
        schema: Vec<&'static str>,
    },
    #[error("model emits {model} classes but the codec knows {codec}")]
    ClassCount { model: usize, codec: usize },
    #[error("column '{0}' is missing from validated input")]
    MissingValue(&'static str),
    #[error("classifier deployment requires a label codec")]
    MissingCodec,
    #[error("{variant} deployment cannot use a {found} model")]
    WrongModelKind {
        variant: &'static str,
        found: &'static str,
    },
    #[error("total_questions must be greater than zero")]
    ZeroTotalQuestions,
}

/// Ordered column declaration co-versioned with a model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: &'static [Column],
}

pub const SCORING_SCHEMA: FeatureSchema = FeatureSchema {
    columns: &[
        numeric("tiempo_respuesta"),
        numeric("provincia_dificultad"),
        numeric("edad"),
        numeric("vidas_usadas"),
        numeric("es_correcto"),
    ],
};

pub const DIFFICULTY_SCHEMA: FeatureSchema = FeatureSchema {
    columns: &[
        numeric("edad"),
        numeric("nro_ronda"),
        numeric("vidas_usadas_ronda"),
        numeric("racha_aciertos"),
        categorical("dificultad_pregunta_anterior"),
        numeric("respuesta_correcta"),
        numeric("tiempo_respuesta"),
    ],
};

impl FeatureSchema {
    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Every column must be backed by exactly one field of a compatible kind,
    /// and optional fields must carry a default so assembly cannot miss them.
    pub fn check_fields(&self, table: &FieldTable) -> Result<(), SchemaError> {
        for column in self.columns {
            let count = table.count(column.name);
            if count != 1 {
                return Err(SchemaError::FieldMapping {
                    column: column.name,
                    count,
                });
            }
            let Some(spec) = table.get(column.name) else {
                return Err(SchemaError::FieldMapping {
                    column: column.name,
                    count: 0,
                });
            };
            let compatible = match column.kind {
                ColumnKind::Numeric => spec.kind != FieldKind::Category,
                ColumnKind::Categorical => spec.kind == FieldKind::Category,
            };
            if !compatible {
                return Err(SchemaError::KindMismatch {
                    column: column.name,
                    column_kind: column.kind,
                    field_kind: spec.kind,
                });
            }
            if !spec.required && spec.default.is_none() {
                return Err(SchemaError::NoDefault(column.name));
            }
        }
        Ok(())
    }

    pub fn check_model(&self, feature_names: &[String]) -> Result<(), SchemaError> {
        let matches = feature_names.len() == self.columns.len()
            && feature_names
                .iter()
                .zip(self.columns)
                .all(|(name, column)| name == column.name);
        if matches {
            Ok(())
        } else {
            Err(SchemaError::ModelColumns {
                model: feature_names.to_vec(),
                schema: self.names(),
            })
        }
    }

    pub fn assemble(&self, input: &ValidatedInput) -> Result<AssembledRow, SchemaError> {
        let mut cells = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let value = input
                .get(column.name)
                .ok_or(SchemaError::MissingValue(column.name))?;
            let cell = match value {
                FieldValue::Category(label) => Cell::Label(label.clone()),
                other => Cell::Numeric(
                    other
                        .as_f64()
                        .ok_or(SchemaError::MissingValue(column.name))?,
                ),
            };
            cells.push((column.name, cell));
        }
        Ok(AssembledRow { cells })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Numeric(f64),
    Label(String),
}

/// Row in model column order whose categorical cells are still labels.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRow {
    cells: Vec<(&'static str, Cell)>,
}

impl AssembledRow {
    pub fn encode(self, codec: Option<&LabelCodec>) -> Result<FeatureVector, CodecError> {
        let mut names = Vec::with_capacity(self.cells.len());
        let mut values = Vec::with_capacity(self.cells.len());
        for (name, cell) in self.cells {
            let value = match cell {
                Cell::Numeric(v) => v,
                Cell::Label(label) => {
                    let codec = codec.ok_or(CodecError::NoCodec(name))?;
                    codec.encode(&label)? as f64
                }
            };
            names.push(name);
            values.push(value);
        }
        Ok(FeatureVector { names, values })
    }
}

/// Fully numeric model input.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<&'static str>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::inference::fields::{difficulty_table, scoring_table, FieldSpec};
    use crate::inference::validator::validate;

    fn codec() -> LabelCodec {
        LabelCodec::new(vec![
            "dificil".to_string(),
            "facil".to_string(),
            "medio".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn builtin_schemas_match_their_tables() {
        SCORING_SCHEMA.check_fields(&scoring_table(false)).unwrap();
        SCORING_SCHEMA.check_fields(&scoring_table(true)).unwrap();
        DIFFICULTY_SCHEMA.check_fields(&difficulty_table()).unwrap();
    }

    #[test]
    fn missing_field_spec_is_detected() {
        let table = FieldTable::new(vec![FieldSpec::integer("edad")]);
        let err = SCORING_SCHEMA.check_fields(&table).unwrap_err();
        assert_eq!(
            err,
            SchemaError::FieldMapping {
                column: "tiempo_respuesta",
                count: 0
            }
        );
    }

    #[test]
    fn categorical_column_needs_category_field() {
        let mut fields: Vec<FieldSpec> = difficulty_table().fields().to_vec();
        fields[4] = FieldSpec::integer("dificultad_pregunta_anterior");
        let err = DIFFICULTY_SCHEMA
            .check_fields(&FieldTable::new(fields))
            .unwrap_err();
        assert!(matches!(err, SchemaError::KindMismatch { .. }));
    }

    #[test]
    fn model_columns_must_match_exactly() {
        let names: Vec<String> = SCORING_SCHEMA.names().iter().map(|s| s.to_string()).collect();
        SCORING_SCHEMA.check_model(&names).unwrap();

        let mut swapped = names.clone();
        swapped.swap(0, 1);
        assert!(SCORING_SCHEMA.check_model(&swapped).is_err());
        assert!(SCORING_SCHEMA.check_model(&names[..4]).is_err());
    }

    #[test]
    fn assembles_scoring_in_training_order() {
        // Request key order differs from the model's column order.
        let raw = json!({
            "es_correcto": 1,
            "vidas_usadas": 2,
            "edad": 10,
            "tiempo_respuesta": 12.5
        });
        let input = validate(&scoring_table(false), raw.as_object().unwrap()).unwrap();
        let vector = SCORING_SCHEMA
            .assemble(&input)
            .unwrap()
            .encode(None)
            .unwrap();
        assert_eq!(vector.names(), SCORING_SCHEMA.names().as_slice());
        assert_eq!(vector.values(), &[12.5, 3.0, 10.0, 2.0, 1.0]);
    }

    #[test]
    fn encodes_categorical_column() {
        let raw = json!({
            "edad": 9,
            "nro_ronda": 2,
            "vidas_usadas_ronda": 1,
            "racha_aciertos": 3,
            "dificultad_pregunta_anterior": "medio",
            "respuesta_correcta": 1,
            "tiempo_respuesta": 4.5
        });
        let input = validate(&difficulty_table(), raw.as_object().unwrap()).unwrap();
        let row = DIFFICULTY_SCHEMA.assemble(&input).unwrap();
        let vector = row.clone().encode(Some(&codec())).unwrap();
        assert_eq!(vector.values(), &[9.0, 2.0, 1.0, 3.0, 2.0, 1.0, 4.5]);

        assert_eq!(
            row.encode(None).unwrap_err(),
            CodecError::NoCodec("dificultad_pregunta_anterior")
        );
    }

    #[test]
    fn unknown_label_fails_encoding() {
        let raw = json!({
            "edad": 9,
            "nro_ronda": 2,
            "vidas_usadas_ronda": 1,
            "racha_aciertos": 3,
            "dificultad_pregunta_anterior": "extremo",
            "respuesta_correcta": 1,
            "tiempo_respuesta": 4.5
        });
        let input = validate(&difficulty_table(), raw.as_object().unwrap()).unwrap();
        let err = DIFFICULTY_SCHEMA
            .assemble(&input)
            .unwrap()
            .encode(Some(&codec()))
            .unwrap_err();
        assert!(matches!(err, CodecError::UnknownCategory { .. }));
    }
}
