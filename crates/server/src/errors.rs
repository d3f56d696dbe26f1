use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use consoleport_types::BridgeError;
use serde_json::json;

/// Failures a request handler can surface to the client.
#[derive(Debug)]
pub enum ApiError {
    Bridge(BridgeError),
    BadRequest(String),
    Internal(String),
}

impl From<BridgeError> for ApiError {
    fn from(error: BridgeError) -> Self {
        Self::Bridge(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Bridge(BridgeError::Validation { errors, .. }) => {
                let message = errors.first_message().unwrap_or("The given data was invalid.").to_string();
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": message, "errors": errors }))).into_response()
            }
            Self::Bridge(error) => {
                let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(json!({ "message": error.to_string() }))).into_response()
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response(),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": message }))).into_response(),
        }
    }
}
