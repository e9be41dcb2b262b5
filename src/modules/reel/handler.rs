use super::dto::{JoinRequest, ReelResponse};
use super::service::ReelService;
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

/// Join clips into a reel with optional voice-over and subtitles
#[utoipa::path(
    post,
    path = "/api/v1/join",
    request_body = JoinRequest,
    responses(
        (status = 201, description = "Reel rendered", body = ApiResponse<ReelResponse>),
        (status = 400, description = "Invalid request", body = ApiResponse<ErrorDetail>),
        (status = 404, description = "A referenced clip does not exist", body = ApiResponse<ErrorDetail>),
        (status = 502, description = "Voice-over could not be fetched", body = ApiResponse<ErrorDetail>),
        (status = 500, description = "Join, mix or overlay failed", body = ApiResponse<ErrorDetail>)
    ),
    tag = "Reels"
)]
pub async fn join_clips(
    State(state): State<AppState>,
    payload: Result<Json<JoinRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(e) => return PipelineError::validation(e.body_text()).into_response(),
    };

    match pipeline::detached(ReelService::join(state, req)).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Reel generated successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}
