//! Stream-copy concatenation of compatible clips.

use crate::common::error::{PipelineError, PipelineResult};
use crate::infrastructure::media::command::FfmpegInvocation;
use crate::infrastructure::media::engine::MediaEngine;
use crate::infrastructure::storage::workspace::RequestScope;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// A clip as the caller named it and where it lives.
#[derive(Clone, Debug)]
pub struct ClipRef {
    pub reference: String,
    pub path: PathBuf,
}

/// Fail on the first clip, in list order, that does not exist.
pub async fn verify_clips(clips: &[ClipRef]) -> PipelineResult<()> {
    if clips.is_empty() {
        return Err(PipelineError::validation("at least one clip is required"));
    }

    for clip in clips {
        if !fs::try_exists(&clip.path).await.unwrap_or(false) {
            return Err(PipelineError::MissingClip(clip.reference.clone()));
        }
    }
    Ok(())
}

/// Concat demuxer list. Order is exactly the input order; duplicates stay.
pub fn concat_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'\n", p.to_string_lossy().replace('\'', r"'\''")))
        .collect()
}

pub fn invocation(list: &Path, output: &Path) -> FfmpegInvocation {
    FfmpegInvocation::new("join", output)
        .input_with(["-f", "concat", "-safe", "0"], list)
        .output_args(["-c", "copy"])
        .faststart()
}

/// Join `clips` into `output` without re-encoding.
pub async fn join_clips(
    engine: &dyn MediaEngine,
    scope: &RequestScope,
    clips: &[ClipRef],
    output: &Path,
) -> PipelineResult<()> {
    verify_clips(clips).await?;

    let mut absolute = Vec::with_capacity(clips.len());
    for clip in clips {
        absolute.push(fs::canonicalize(&clip.path).await?);
    }

    let list = scope.path("concat.txt");
    fs::write(&list, concat_list(&absolute)).await?;

    info!("🔗 Joining {} clips", clips.len());
    engine
        .run(&invocation(&list, output))
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))?;

    if !super::has_content(output).await {
        return Err(PipelineError::Join("concatenation produced no output".to_string()));
    }
    Ok(())
}
