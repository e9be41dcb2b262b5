//! Optional voice-over mixing.

use crate::common::error::{PipelineError, PipelineResult};
use crate::infrastructure::http::fetcher::{scratch_name, Fetcher};
use crate::infrastructure::media::command::FfmpegInvocation;
use crate::infrastructure::media::engine::MediaEngine;
use crate::infrastructure::media::filter_graph::{Filter, FilterChain, FilterGraph};
use crate::infrastructure::storage::workspace::RequestScope;
use std::path::{Path, PathBuf};
use tracing::info;

const MIXED_AUDIO: &str = "aout";

/// Mix the video's own audio (if any) with the voice-over. The result runs
/// as long as the longer input; the shorter one is padded with silence.
pub fn invocation(video: &Path, voice_over: &Path, output: &Path, video_has_audio: bool) -> FfmpegInvocation {
    let base = FfmpegInvocation::new("mix", output)
        .input(video)
        .input(voice_over);

    let base = if video_has_audio {
        let graph = FilterGraph::new().chain(
            FilterChain::new("mix")
                .input("0:a")
                .input("1:a")
                .filter(
                    Filter::new("amix")
                        .arg("inputs", 2)
                        .arg("duration", "longest")
                        .arg("dropout_transition", 0),
                )
                .output(MIXED_AUDIO),
        );
        base.filter_complex(graph)
            .map_stream("0:v")
            .map_label(MIXED_AUDIO)
    } else {
        base.map_stream("0:v").map_stream("1:a")
    };

    base.video_codec("copy")
        .audio_codec("aac")
        .output_args(["-b:a", "192k"])
        .faststart()
}

/// Fetch and mix `audio_url` into `video`. Without a voice-over the input is
/// returned untouched.
pub async fn mix_voice_over(
    engine: &dyn MediaEngine,
    fetcher: &Fetcher,
    scope: &RequestScope,
    video: PathBuf,
    audio_url: Option<&str>,
) -> PipelineResult<PathBuf> {
    let Some(url) = audio_url else {
        return Ok(video);
    };

    let voice_over = scope.path(&scratch_name("voice-over", url, "audio"));
    fetcher
        .fetch(url, &voice_over)
        .await
        .map_err(PipelineError::from_audio_fetch)?;

    let video_has_audio = engine
        .has_audio(&video)
        .await
        .map_err(|e| PipelineError::Mix(e.to_string()))?;
    info!("🔊 Mixing voice-over (video has own audio: {})", video_has_audio);

    let output = scope.path("mixed.mp4");
    engine
        .run(&invocation(&video, &voice_over, &output, video_has_audio))
        .await
        .map_err(|e| PipelineError::Mix(e.to_string()))?;

    if !super::has_content(&output).await {
        return Err(PipelineError::Mix("mix produced no output".to_string()));
    }
    Ok(output)
}
