use super::dto::{JoinRequest, ReelResponse};
use crate::common::error::PipelineResult;
use crate::pipeline::join::{self, ClipRef};
use crate::pipeline::overlay::{self, SubtitleEntry};
use crate::pipeline::{self, mix};
use crate::state::AppState;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct ReelService;

impl ReelService {
    fn output_file_name(requested: Option<&str>) -> String {
        match requested {
            Some(name) if name.ends_with(".mp4") => name.to_string(),
            Some(name) => format!("{}.mp4", name),
            None => format!("reel_{}.mp4", Uuid::new_v4().simple()),
        }
    }

    /// Join → mix → overlay → publish. Every failure aborts the whole request.
    pub async fn join(state: AppState, req: JoinRequest) -> PipelineResult<ReelResponse> {
        req.validate()?;

        let clips = req
            .clips
            .iter()
            .map(|reference| {
                Ok(ClipRef {
                    reference: reference.clone(),
                    path: state.workspace.resolve_clip(reference)?,
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        // Reject unknown clips before anything is allocated.
        join::verify_clips(&clips).await?;

        let subtitles: Vec<SubtitleEntry> = req.subtitles.into_iter().map(Into::into).collect();
        let file_name = Self::output_file_name(req.output_name.as_deref());
        info!(
            "🎞️ Building {} from {} clips ({} subtitles, voice-over: {})",
            file_name,
            clips.len(),
            subtitles.len(),
            req.audio_url.is_some()
        );

        let scope = state.workspace.scope().await?;
        state.cleanup.schedule(scope.dir());

        let output = state.workspace.media_path(&file_name);
        let expires_at = state.cleanup.schedule(&output);

        let engine = state.engine.as_ref();
        let joined = scope.path("joined.mp4");
        join::join_clips(engine, &scope, &clips, &joined).await?;

        let mixed =
            mix::mix_voice_over(engine, &state.fetcher, &scope, joined, req.audio_url.as_deref())
                .await?;

        let finished =
            overlay::burn_subtitles(engine, &scope, mixed, &subtitles, &state.config.subtitles)
                .await?;

        pipeline::publish(&finished, &output).await?;
        scope.release().await;

        info!("✅ Reel ready at {}", output.display());
        Ok(ReelResponse {
            video_path: output.display().to_string(),
            video_url: state.config.public_url(&file_name),
            clip_count: clips.len(),
            expires_at,
        })
    }
}
