use super::dto::{MixRequest, MixResponse};
use super::service::MixService;
use crate::common::response::{ApiError, ApiSuccess, ErrorBody};
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

/// Mix a voice track over a looping music bed
///
/// Downloads both URLs, runs ffmpeg once and uploads the MP3 to object storage.
#[utoipa::path(
    post,
    path = "/mix",
    request_body = MixRequest,
    responses(
        (status = 200, description = "Mix uploaded", body = MixResponse),
        (status = 400, description = "Invalid request or download failed", body = ErrorBody),
        (status = 422, description = "Body does not match the schema", body = ErrorBody),
        (status = 500, description = "ffmpeg or storage failure", body = ErrorBody),
        (status = 504, description = "ffmpeg or upload timed out", body = ErrorBody)
    ),
    tag = "Mix"
)]
pub async fn mix(
    State(state): State<AppState>,
    payload: Result<Json<MixRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };

    match MixService::mix(state, req).await {
        Ok(res) => ApiSuccess(res, StatusCode::OK).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
