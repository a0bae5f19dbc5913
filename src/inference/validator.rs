use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::{CODE_INVALID_DATA_TYPES, CODE_MISSING_FIELDS};
use crate::inference::fields::{FieldKind, FieldSpec, FieldTable, FieldValue};

/// Request body as received, before any field has been checked.
pub type RawRequest = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Campos faltantes: {}", .missing.join(", "))]
    MissingFields {
        missing: Vec<&'static str>,
        required: Vec<&'static str>,
        optional: Vec<&'static str>,
    },
    #[error("Error en tipos de datos: {field}: {detail}")]
    InvalidType { field: &'static str, detail: String },
    #[error("{message}")]
    OutOfRange {
        field: &'static str,
        code: &'static str,
        message: &'static str,
    },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields { .. } => CODE_MISSING_FIELDS,
            ValidationError::InvalidType { .. } => CODE_INVALID_DATA_TYPES,
            ValidationError::OutOfRange { code, .. } => *code,
        }
    }
}

/// Typed, range-checked request fields in declaration order.
///
/// Only [`validate`] builds one, so holding a `ValidatedInput` means every
/// declared field passed its checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    values: Vec<(&'static str, FieldValue)>,
    defaulted: Vec<&'static str>,
}

impl ValidatedInput {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    /// Fields that were absent from the request and took their default.
    pub fn defaulted(&self) -> &[&'static str] {
        &self.defaulted
    }
}

/// Checks presence, then coerces types, then checks ranges.
///
/// Presence failures list every missing field at once; coercion and range
/// failures stop at the first offending field in declaration order.
pub fn validate(table: &FieldTable, raw: &RawRequest) -> Result<ValidatedInput, ValidationError> {
    let missing: Vec<&'static str> = table
        .fields()
        .iter()
        .filter(|f| f.required && !raw.contains_key(f.name))
        .map(|f| f.name)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields {
            missing,
            required: table.required_names(),
            optional: table.optional_names(),
        });
    }

    let mut values = Vec::with_capacity(table.fields().len());
    let mut defaulted = Vec::new();
    for spec in table.fields() {
        match raw.get(spec.name) {
            Some(value) => {
                let coerced = coerce(spec, value).map_err(|detail| ValidationError::InvalidType {
                    field: spec.name,
                    detail,
                })?;
                values.push((spec.name, coerced));
            }
            None => {
                if let Some(default) = &spec.default {
                    values.push((spec.name, default.clone()));
                    defaulted.push(spec.name);
                }
            }
        }
    }

    for (name, value) in &values {
        let Some(spec) = table.get(name) else {
            continue;
        };
        if !spec.domain.admits(value) {
            return Err(ValidationError::OutOfRange {
                field: spec.name,
                code: spec.range_code,
                message: spec.range_message,
            });
        }
    }

    Ok(ValidatedInput { values, defaulted })
}

fn coerce(spec: &FieldSpec, value: &Value) -> Result<FieldValue, String> {
    match spec.kind {
        FieldKind::Integer => coerce_integer(value).map(FieldValue::Int),
        FieldKind::Float => coerce_float(value).map(FieldValue::Float),
        FieldKind::Category => match value {
            Value::String(s) => Ok(FieldValue::Category(s.clone())),
            other => Err(format!("valor {other} no es una etiqueta de texto")),
        },
    }
}

fn coerce_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            // Fractional numbers truncate toward zero, like an integer cast.
            match n.as_f64() {
                Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
                _ => Err(format!("valor {n} fuera del rango de un entero")),
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("valor \"{s}\" no es un entero ({e})")),
        other => Err(format!("valor {other} no convertible a entero")),
    }
}

fn coerce_float(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("valor {n} no convertible a decimal"))?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("valor \"{s}\" no es un número decimal ({e})"))?,
        other => return Err(format!("valor {other} no convertible a decimal")),
    };
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("valor {value} no es un número finito"))
    }
}
