use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Error payload. Clients of the mixer read `detail`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub ok: bool,
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: &str) -> Self {
        Self {
            ok: false,
            detail: detail.to_string(),
        }
    }
}

pub struct ApiSuccess<T>(pub T, pub StatusCode);

impl<T> IntoResponse for ApiSuccess<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let (body, status) = (self.0, self.1);
        (status, Json(body)).into_response()
    }
}

#[derive(Debug)]
pub struct ApiError(pub String, pub StatusCode);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, status) = (self.0, self.1);
        if status.is_server_error() {
            error!(status = status.as_u16(), detail = %message, "Request failed");
        }
        (status, Json(ErrorBody::new(&message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(rejection.body_text(), rejection.status())
    }
}
