use std::any::Any;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::constants::{CODE_INTERNAL_ERROR, CODE_INVALID_DATA_TYPES, CODE_MODEL_NOT_LOADED, CODE_NOT_FOUND};
use crate::inference::validator::ValidationError;
use crate::inference::PipelineError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub codigo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campos_requeridos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campos_opcionales: Option<Vec<String>>,
    #[serde(rename = "traceId", skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub required_fields: Option<Vec<String>>,
    pub optional_fields: Option<Vec<String>>,
    pub is_operational: bool,
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
            required_fields: None,
            optional_fields: None,
            is_operational: true,
        }
    }

    pub fn invalid_body(message: &str) -> Self {
        Self::bad_request(CODE_INVALID_DATA_TYPES, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            ..Self::bad_request(CODE_NOT_FOUND, message)
        }
    }

    pub fn model_not_loaded(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            is_operational: false,
            ..Self::bad_request(CODE_MODEL_NOT_LOADED, message)
        }
    }

    /// Server-side failure. The cause stays in the message for diagnosis.
    pub fn internal(cause: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            is_operational: false,
            ..Self::bad_request(
                CODE_INTERNAL_ERROR,
                &format!("Error interno del servidor: {cause}"),
            )
        }
    }

    pub fn with_fields(mut self, required: &[&str], optional: &[&str]) -> Self {
        self.required_fields = Some(required.iter().map(|s| s.to_string()).collect());
        self.optional_fields = Some(optional.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
            codigo: self.code.clone(),
            campos_requeridos: self.required_fields.clone(),
            campos_opcionales: self.optional_fields.clone(),
            trace_id: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (self.status, Json(self.body())).into_response()
    }
}

// 请求侧错误 -> 400；模型缺失与推理失败 -> 500
impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        match &value {
            PipelineError::Invalid(ValidationError::MissingFields {
                required, optional, ..
            }) => AppError::bad_request(value.code(), &value.to_string())
                .with_fields(required, optional),
            PipelineError::Invalid(_) | PipelineError::UnknownCategory(_) => {
                AppError::bad_request(value.code(), &value.to_string())
            }
            PipelineError::ModelNotLoaded => AppError::model_not_loaded(&value.to_string()),
            PipelineError::Internal(cause) => AppError::internal(cause),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(data))
}

/// Response for a handler that panicked, in the same shape as every other
/// server-side error.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "panic".to_string()
    };
    AppError::internal(&detail).into_response()
}
