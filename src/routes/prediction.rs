use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::extractors::JsonBody;
use crate::inference::validator::RawRequest;
use crate::inference::{PipelineError, PredictionResult};
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/predecir", post(predict))
        .route("/ejemplo", get(example))
        .route("/test", post(self_test))
}

/// Model availability is checked before the body is even parsed, so an
/// unloaded model answers `MODEL_NOT_LOADED` whatever the payload.
async fn predict(
    State(state): State<AppState>,
    body: Result<JsonBody<RawRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let pipeline = state.pipeline();
    if !pipeline.is_ready() {
        return Err(PipelineError::ModelNotLoaded.into());
    }
    let JsonBody(raw) = body?;
    let result = pipeline.predict(&raw)?;
    Ok(ok(result))
}

async fn example(State(state): State<AppState>) -> impl IntoResponse {
    let pipeline = state.pipeline();
    let variant = pipeline.variant();
    let table = pipeline.table();

    let mut body = serde_json::json!({
        "ejemplo_peticion": variant.example_request(),
        "campos_requeridos": table.required_names(),
        "campos_opcionales": table.optional_names(),
        "respuesta_esperada": variant.example_response(),
    });
    if let (Some(codec), Some(obj)) = (
        pipeline.model().and_then(|m| m.codec()),
        body.as_object_mut(),
    ) {
        obj.insert("valores_categoricos".to_string(), serde_json::json!(codec.classes()));
    }
    Json(body)
}

#[derive(Debug, Serialize)]
struct SelfTestReport {
    test_result: &'static str,
    datos_enviados: Value,
    #[serde(flatten)]
    resultado: PredictionResult,
    mensaje: &'static str,
}

#[derive(Debug, Serialize)]
struct SelfTestFailure {
    test_result: &'static str,
    error: String,
    codigo: String,
    mensaje: &'static str,
}

/// Runs the variant's hard-coded request through the full pipeline.
async fn self_test(State(state): State<AppState>) -> axum::response::Response {
    let pipeline = state.pipeline();
    let request = pipeline.variant().self_test_request();
    let raw = request.as_object().cloned().unwrap_or_default();

    match pipeline.predict(&raw) {
        Ok(resultado) => ok(SelfTestReport {
            test_result: "SUCCESS",
            datos_enviados: request,
            resultado,
            mensaje: "El modelo funciona correctamente",
        })
        .into_response(),
        Err(e) => {
            let err = AppError::from(e);
            tracing::error!(code = %err.code, error = %err.message, "Self-test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SelfTestFailure {
                    test_result: "FAILED",
                    error: err.message,
                    codigo: err.code,
                    mensaje: "Error al probar el modelo",
                }),
            )
                .into_response()
        }
    }
}
