use super::dto::{ClipResponse, GenerateClipRequest};
use super::service::ClipService;
use crate::common::error::PipelineError;
use crate::common::response::{ApiResponse, ApiSuccess, ErrorDetail};
use crate::pipeline;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Render a zoom/pan clip from a still image
#[utoipa::path(
    post,
    path = "/api/v1/generate",
    request_body = GenerateClipRequest,
    responses(
        (status = 201, description = "Clip rendered", body = ApiResponse<ClipResponse>),
        (status = 400, description = "Invalid parameters", body = ApiResponse<ErrorDetail>),
        (status = 422, description = "Image is not plausible media", body = ApiResponse<ErrorDetail>),
        (status = 502, description = "Image could not be fetched", body = ApiResponse<ErrorDetail>),
        (status = 500, description = "Render failed", body = ApiResponse<ErrorDetail>)
    ),
    tag = "Clips"
)]
pub async fn generate_clip(
    State(state): State<AppState>,
    payload: Result<Json<GenerateClipRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(e) => return PipelineError::validation(e.body_text()).into_response(),
    };

    match pipeline::detached(ClipService::generate(state, req)).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Clip generated successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}
