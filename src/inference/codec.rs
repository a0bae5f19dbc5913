use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("etiqueta desconocida '{label}'; valores aceptados: {}", .known.join(", "))]
    UnknownCategory { label: String, known: Vec<String> },
    #[error("código de clase {0} fuera del vocabulario")]
    UnknownCode(usize),
    #[error("columna categórica '{0}' sin codificador")]
    NoCodec(&'static str),
    #[error("vocabulary is empty")]
    EmptyVocabulary,
    #[error("duplicate label in vocabulary: {0}")]
    DuplicateLabel(String),
}

/// On-disk form of a label encoder: `{ "classes": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct CodecArtifact {
    pub classes: Vec<String>,
}

/// Bidirectional mapping between labels and the integer codes a model was
/// trained on. The code of a label is its position in `classes`.
#[derive(Debug, Clone)]
pub struct LabelCodec {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelCodec {
    pub fn new(classes: Vec<String>) -> Result<Self, CodecError> {
        if classes.is_empty() {
            return Err(CodecError::EmptyVocabulary);
        }
        let mut index = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if index.insert(label.clone(), code).is_some() {
                return Err(CodecError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { classes, index })
    }

    pub fn from_artifact(artifact: CodecArtifact) -> Result<Self, CodecError> {
        Self::new(artifact.classes)
    }

    pub fn encode(&self, label: &str) -> Result<usize, CodecError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| CodecError::UnknownCategory {
                label: label.to_string(),
                known: self.classes.clone(),
            })
    }

    pub fn decode(&self, code: usize) -> Result<&str, CodecError> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(CodecError::UnknownCode(code))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
