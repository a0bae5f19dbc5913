use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

pub async fn health_check(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let pipeline = state.pipeline();
    let artifacts = state.artifacts();
    let settings = pipeline.settings();

    let mensaje = if pipeline.is_ready() {
        "Backend funcionando correctamente"
    } else {
        "Backend en ejecución sin modelo: las predicciones devolverán MODEL_NOT_LOADED"
    };

    Json(serde_json::json!({
        "status": "OK",
        "modelo_disponible": artifacts.modelo_disponible,
        "codificador_disponible": artifacts.codificador_disponible,
        "listo": pipeline.is_ready(),
        "variante": settings.variant,
        "total_preguntas": settings.variant.is_scoring().then_some(settings.total_questions),
        "modelo_sha256": artifacts.modelo_sha256,
        "codificador_sha256": artifacts.codificador_sha256,
        "uptime_secs": state.uptime_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "mensaje": mensaje,
        "endpoints": {
            "GET /health": "Verificar estado de la API",
            "GET /health/live": "Proceso vivo",
            "GET /health/ready": "Modelo cargado y listo para predecir",
            "POST /predecir": "Predecir con el modelo desplegado",
            "GET /ejemplo": "Obtener ejemplo de datos para testing",
            "POST /test": "Probar el modelo con datos fijos",
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.pipeline().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
