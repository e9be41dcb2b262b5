use super::dto::{ClipResponse, GenerateClipRequest};
use crate::common::error::{PipelineError, PipelineResult};
use crate::infrastructure::http::fetcher::scratch_name;
use crate::pipeline::{self, render::{self, ClipSpec}};
use crate::state::AppState;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct ClipService;

impl ClipService {
    /// Fetch the image, render the clip in scratch space, publish it into the
    /// media directory and schedule both the clip and the scope for removal.
    pub async fn generate(state: AppState, req: GenerateClipRequest) -> PipelineResult<ClipResponse> {
        req.validate()?;

        let max_seconds = state.config.render.max_clip_seconds;
        if req.length > max_seconds {
            return Err(PipelineError::validation(format!(
                "length must not exceed {} seconds",
                max_seconds
            )));
        }

        let id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let spec = ClipSpec::new(req.length, req.frame_rate, req.zoom_speed, &state.config.render);
        info!("🎥 Generating clip {} from {}", id, req.image_url);

        let scope = state.workspace.scope().await?;
        state.cleanup.schedule(scope.dir());

        let file_name = format!("{}.mp4", id);
        let output = state.workspace.media_path(&file_name);
        let expires_at = state.cleanup.schedule(&output);

        let image = scope.path(&scratch_name("source", &req.image_url, "img"));
        state
            .fetcher
            .fetch(&req.image_url, &image)
            .await
            .map_err(PipelineError::from_image_fetch)?;

        let rendered = scope.path("clip.mp4");
        render::render_clip(state.engine.as_ref(), &image, &rendered, &spec).await?;
        pipeline::publish(&rendered, &output).await?;
        scope.release().await;

        info!("✅ Clip {} ready at {}", id, output.display());
        Ok(ClipResponse {
            video_path: output.display().to_string(),
            video_url: state.config.public_url(&file_name),
            duration: spec.duration,
            frame_rate: spec.frame_rate,
            expires_at,
            id,
        })
    }
}
