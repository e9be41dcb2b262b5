use crate::common::response::ErrorDetail;
use crate::modules::clip::dto::{ClipResponse, GenerateClipRequest};
use crate::modules::reel::dto::{JoinRequest, ReelResponse, SubtitleRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::clip::handler::generate_clip,
        crate::modules::reel::handler::join_clips,
    ),
    components(
        schemas(
            GenerateClipRequest, ClipResponse,
            JoinRequest, SubtitleRequest, ReelResponse,
            ErrorDetail,
        )
    ),
    tags(
        (name = "Clips", description = "Render zoom/pan clips from still images"),
        (name = "Reels", description = "Join clips with voice-over and subtitles")
    )
)]
pub struct ApiDoc;
