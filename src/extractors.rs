use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::constants::CODE_PAYLOAD_TOO_LARGE;
use crate::response::AppError;

/// A wrapper around `axum::Json<T>` that returns `AppError` on deserialization failure
/// instead of Axum's default plain-text rejection.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection_to_app_error(rejection)),
        }
    }
}

fn json_rejection_to_app_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            tracing::warn!(error = %e, "JSON body is not an object");
            AppError::invalid_body("El cuerpo de la petición debe ser un objeto JSON")
        }
        JsonRejection::JsonSyntaxError(e) => {
            tracing::warn!(error = %e, "JSON syntax parsing failed");
            AppError::invalid_body("El cuerpo de la petición no es JSON válido")
        }
        JsonRejection::MissingJsonContentType(e) => {
            tracing::warn!(error = %e, "Missing or invalid JSON Content-Type");
            AppError::invalid_body("Se requiere Content-Type: application/json")
        }
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(error = %other, "Request body over size limit");
            AppError {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                ..AppError::bad_request(
                    CODE_PAYLOAD_TOO_LARGE,
                    "El cuerpo de la petición supera el tamaño máximo permitido",
                )
            }
        }
        other => {
            tracing::warn!(error = %other, "Unexpected JSON body rejection");
            AppError::invalid_body("Cuerpo de la petición inválido")
        }
    }
}
