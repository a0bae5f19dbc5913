pub mod codec;
pub mod features;
pub mod fields;
pub mod normalizer;
pub mod pipeline;
pub mod predictor;
pub mod validator;
pub mod variant;

pub use pipeline::{Pipeline, PipelineError, PipelineSettings, PredictionResult};
pub use predictor::{Model, ModelHandle, RawOutput};
pub use variant::Variant;
