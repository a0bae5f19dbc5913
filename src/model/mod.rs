//! Loading of model and label-codec artifacts exported by the offline
//! training job. Artifacts are JSON; nothing here trains or mutates them.

pub mod forest;
pub mod linear;

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::inference::codec::{CodecArtifact, LabelCodec};
use crate::inference::codec::CodecError;
use crate::inference::predictor::{Model, ModelHandle};

use self::forest::TreeEnsemble;
use self::linear::LinearRegression;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: ArtifactError,
    },
}

/// Structural defects in an artifact that parsed as JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArtifactError {
    #[error("{coefficients} coefficients for {features} features")]
    CoefficientCount { coefficients: usize, features: usize },
    #[error("classification ensemble needs n_classes > 0")]
    NoClasses,
    #[error("ensemble has no trees")]
    NoTrees,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node}: feature {feature} out of range")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
    },
    #[error("tree {tree} node {node}: non-finite threshold")]
    NonFiniteThreshold { tree: usize, node: usize },
    #[error("tree {tree} node {node}: bad child index {child}")]
    BadChild {
        tree: usize,
        node: usize,
        child: usize,
    },
    #[error("tree {tree} node {node}: leaf width {width} expected {expected}")]
    LeafWidth {
        tree: usize,
        node: usize,
        width: usize,
        expected: usize,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearRegression(LinearRegression),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    pub fn into_model(self) -> Result<Box<dyn Model>, ArtifactError> {
        match self {
            ModelArtifact::LinearRegression(m) => {
                m.check()?;
                Ok(Box::new(m))
            }
            ModelArtifact::TreeEnsemble(m) => {
                m.check()?;
                Ok(Box::new(m))
            }
        }
    }
}

/// Availability of the loaded artifacts, reported by the liveness probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub modelo_disponible: bool,
    /// `None` when the deployed variant has no categorical features.
    pub codificador_disponible: Option<bool>,
    pub modelo_sha256: Option<String>,
    pub codificador_sha256: Option<String>,
}

#[derive(Debug)]
pub struct LoadedArtifacts {
    pub handle: Option<ModelHandle>,
    pub status: ArtifactStatus,
}

/// Reads a file, returning `None` when it does not exist.
fn read_artifact(path: &Path) -> Result<Option<(Vec<u8>, String)>, ModelLoadError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let digest = hex::encode(Sha256::digest(&bytes));
            Ok(Some((bytes, digest)))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ModelLoadError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

pub fn load_model(path: &Path) -> Result<Option<(Box<dyn Model>, String)>, ModelLoadError> {
    let Some((bytes, digest)) = read_artifact(path)? else {
        return Ok(None);
    };
    let artifact: ModelArtifact =
        serde_json::from_slice(&bytes).map_err(|source| ModelLoadError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    let model = artifact
        .into_model()
        .map_err(|source| ModelLoadError::Invalid {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some((model, digest)))
}

pub fn load_codec(path: &Path) -> Result<Option<(LabelCodec, String)>, ModelLoadError> {
    let Some((bytes, digest)) = read_artifact(path)? else {
        return Ok(None);
    };
    let artifact: CodecArtifact =
        serde_json::from_slice(&bytes).map_err(|source| ModelLoadError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    let codec = LabelCodec::from_artifact(artifact).map_err(|e| ModelLoadError::Invalid {
        path: path.display().to_string(),
        source: e.into(),
    })?;
    Ok(Some((codec, digest)))
}

/// Loads the model (and codec, when `encoder_path` is set) for one process.
///
/// Missing files leave the handle absent; the service then answers
/// `MODEL_NOT_LOADED`. Present but unreadable or malformed files are errors.
pub fn load_artifacts(
    model_path: &str,
    encoder_path: Option<&str>,
) -> Result<LoadedArtifacts, ModelLoadError> {
    let model = load_model(Path::new(model_path))?;
    match &model {
        Some((m, digest)) => tracing::info!(
            path = model_path,
            sha256 = %digest,
            features = m.feature_names().len(),
            "Model loaded"
        ),
        None => tracing::error!(path = model_path, "Model file not found, predictions disabled"),
    }

    let codec = match encoder_path {
        Some(path) => {
            let codec = load_codec(Path::new(path))?;
            match &codec {
                Some((c, digest)) => {
                    tracing::info!(path, sha256 = %digest, classes = c.len(), "Label codec loaded")
                }
                None => tracing::error!(path, "Label codec file not found, predictions disabled"),
            }
            Some(codec)
        }
        None => None,
    };

    let mut status = ArtifactStatus {
        modelo_disponible: model.is_some(),
        codificador_disponible: codec.as_ref().map(Option::is_some),
        ..ArtifactStatus::default()
    };

    let handle = match (model, codec) {
        (Some((model, model_digest)), None) => {
            status.modelo_sha256 = Some(model_digest);
            Some(ModelHandle::from_boxed(model))
        }
        (Some((model, model_digest)), Some(Some((codec, codec_digest)))) => {
            status.modelo_sha256 = Some(model_digest);
            status.codificador_sha256 = Some(codec_digest);
            Some(ModelHandle::from_boxed(model).with_codec(codec))
        }
        (Some((_, model_digest)), Some(None)) => {
            status.modelo_sha256 = Some(model_digest);
            None
        }
        (None, codec) => {
            if let Some(Some((_, codec_digest))) = codec {
                status.codificador_sha256 = Some(codec_digest);
            }
            None
        }
    };

    Ok(LoadedArtifacts { handle, status })
}
