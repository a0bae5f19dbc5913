//! Static field declarations for each deployed variant.
//!
//! The declaration order of a [`FieldTable`] is significant: it is the order
//! in which coercion and range failures are reported.

use crate::constants::{CODE_INVALID_AGE, CODE_INVALID_RANGE, DEFAULT_PROVINCIA_DIFICULTAD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Category,
}

/// Accepted values for a field once it has been coerced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    Any,
    /// Inclusive integer bounds.
    IntRange { min: i64, max: i64 },
    IntSet(&'static [i64]),
    FloatAtLeast(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Category(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Category(_) => None,
        }
    }
}

impl Domain {
    pub fn admits(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Domain::Any, _) => true,
            (Domain::IntRange { min, max }, FieldValue::Int(v)) => (*min..=*max).contains(v),
            (Domain::IntSet(allowed), FieldValue::Int(v)) => allowed.contains(v),
            (Domain::FloatAtLeast(min), FieldValue::Float(v)) => *v >= *min,
            (Domain::FloatAtLeast(min), FieldValue::Int(v)) => *v as f64 >= *min,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub domain: Domain,
    pub default: Option<FieldValue>,
    /// Error code reported when `domain` rejects the value.
    pub range_code: &'static str,
    pub range_message: &'static str,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            domain: Domain::Any,
            default: None,
            range_code: CODE_INVALID_RANGE,
            range_message: "",
        }
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn category(name: &'static str) -> Self {
        Self::new(name, FieldKind::Category)
    }

    pub fn between(mut self, min: i64, max: i64, message: &'static str) -> Self {
        self.domain = Domain::IntRange { min, max };
        self.range_message = message;
        self
    }

    pub fn one_of(mut self, allowed: &'static [i64], message: &'static str) -> Self {
        self.domain = Domain::IntSet(allowed);
        self.range_message = message;
        self
    }

    pub fn at_least(mut self, min: f64, message: &'static str) -> Self {
        self.domain = Domain::FloatAtLeast(min);
        self.range_message = message;
        self
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.range_code = code;
        self
    }

    /// Marks the field optional; absent values are replaced by `default`.
    pub fn optional(mut self, default: FieldValue) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Vec<FieldSpec>,
}

impl FieldTable {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of declarations carrying `name`; used by the startup schema check.
    pub fn count(&self, name: &str) -> usize {
        self.fields.iter().filter(|f| f.name == name).count()
    }

    pub fn required_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    pub fn optional_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| !f.required)
            .map(|f| f.name)
            .collect()
    }
}

/// Fields of both quiz-scoring variants. `provincia_dificultad` is optional
/// with a default of 3 unless the deployment requires it.
pub fn scoring_table(provincia_dificultad_required: bool) -> FieldTable {
    let mut provincia = FieldSpec::integer("provincia_dificultad").between(
        1,
        5,
        "provincia_dificultad debe estar entre 1 y 5",
    );
    if !provincia_dificultad_required {
        provincia = provincia.optional(FieldValue::Int(DEFAULT_PROVINCIA_DIFICULTAD));
    }

    FieldTable::new(vec![
        FieldSpec::float("tiempo_respuesta").at_least(0.0, "tiempo_respuesta debe ser positivo"),
        provincia,
        FieldSpec::integer("edad")
            .between(3, 18, "edad debe estar entre 3 y 18 años")
            .with_code(CODE_INVALID_AGE),
        FieldSpec::integer("vidas_usadas").between(0, 3, "vidas_usadas debe estar entre 0 y 3"),
        FieldSpec::integer("es_correcto").one_of(&[0, 1], "es_correcto debe ser 0 o 1"),
    ])
}

pub fn difficulty_table() -> FieldTable {
    FieldTable::new(vec![
        FieldSpec::integer("edad")
            .between(0, 18, "edad debe estar entre 0 y 18 años")
            .with_code(CODE_INVALID_AGE),
        FieldSpec::integer("nro_ronda"),
        FieldSpec::integer("vidas_usadas_ronda"),
        FieldSpec::integer("racha_aciertos"),
        FieldSpec::category("dificultad_pregunta_anterior"),
        FieldSpec::integer("respuesta_correcta")
            .one_of(&[0, 1], "respuesta_correcta debe ser 0 o 1"),
        FieldSpec::float("tiempo_respuesta"),
    ])
}
