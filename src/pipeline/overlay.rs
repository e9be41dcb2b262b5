//! Burned-in subtitles, one drawtext per entry, chained in list order.

use crate::common::error::{PipelineError, PipelineResult};
use crate::config::settings::SubtitleStyle;
use crate::infrastructure::media::command::FfmpegInvocation;
use crate::infrastructure::media::engine::MediaEngine;
use crate::infrastructure::media::filter_graph::{Filter, FilterChain, FilterGraph};
use crate::infrastructure::storage::workspace::RequestScope;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Debug, PartialEq)]
pub struct SubtitleEntry {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Visible on `[start, end)`.
pub fn enable_expr(start: f64, end: f64) -> String {
    format!("gte(t,{:.3})*lt(t,{:.3})", start, end)
}

fn drawtext(entry: &SubtitleEntry, style: &SubtitleStyle) -> Filter {
    let filter = Filter::new("drawtext")
        .text("text", entry.text.as_str())
        .arg("expansion", "none");

    let filter = match &style.font_file {
        Some(font) => filter.text("fontfile", font.to_string_lossy()),
        None => filter,
    };

    filter
        .arg("fontsize", style.font_size)
        .arg("fontcolor", "white")
        .arg("box", 1)
        .arg("boxcolor", "black@0.5")
        .arg("boxborderw", 12)
        .expr("x", "(w-text_w)/2")
        .expr("y", format!("h-text_h-{}", style.bottom_offset))
        .expr("enable", enable_expr(entry.start, entry.end))
}

/// Entry `i` reads the output of entry `i - 1`; entry 0 reads the source
/// video. Later entries therefore draw on top of earlier ones.
pub fn overlay_graph(entries: &[SubtitleEntry], style: &SubtitleStyle) -> FilterGraph {
    let mut graph = FilterGraph::new();
    let mut previous = "0:v".to_string();

    for (i, entry) in entries.iter().enumerate() {
        let label = format!("sub{}", i + 1);
        graph.push(
            FilterChain::new(format!("subtitle {}", i + 1))
                .input(previous)
                .filter(drawtext(entry, style))
                .output(label.as_str()),
        );
        previous = label;
    }

    graph
}

pub fn invocation(video: &Path, output: &Path, graph: FilterGraph) -> FfmpegInvocation {
    let last = graph.final_output().unwrap_or("0:v").to_string();

    FfmpegInvocation::new("overlay", output)
        .input(video)
        .filter_complex(graph)
        .map_label(&last)
        .map_stream("0:a?")
        .video_codec("libx264")
        .output_args(["-preset", "veryfast"])
        .pixel_format("yuv420p")
        .audio_codec("copy")
        .faststart()
}

/// Burn `entries` into `video`. Without entries the input is returned
/// untouched.
pub async fn burn_subtitles(
    engine: &dyn MediaEngine,
    scope: &RequestScope,
    video: PathBuf,
    entries: &[SubtitleEntry],
    style: &SubtitleStyle,
) -> PipelineResult<PathBuf> {
    if entries.is_empty() {
        return Ok(video);
    }

    info!("💬 Burning {} subtitle entries", entries.len());
    let output = scope.path("subtitled.mp4");
    let graph = overlay_graph(entries, style);

    engine
        .run(&invocation(&video, &output, graph))
        .await
        .map_err(|e| PipelineError::Overlay(e.to_string()))?;

    if !super::has_content(&output).await {
        return Err(PipelineError::Overlay("overlay produced no output".to_string()));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{workspace, RecordingEngine};

    fn style() -> SubtitleStyle {
        SubtitleStyle {
            font_size: 56,
            bottom_offset: 160,
            font_file: None,
        }
    }

    fn entry(text: &str, start: f64, end: f64) -> SubtitleEntry {
        SubtitleEntry {
            text: text.to_string(),
            start,
            end,
        }
    }

    /// Evaluates the enable window the way the engine does for time `t`.
    fn visible(entry: &SubtitleEntry, t: f64) -> bool {
        t >= entry.start && t < entry.end
    }

    #[test]
    fn entries_chain_in_list_order_not_time_order() {
        let entries = [entry("late", 5.0, 6.0), entry("early", 0.0, 1.0)];
        let rendered = overlay_graph(&entries, &style()).render();

        let chains: Vec<_> = rendered.split(';').collect();
        assert_eq!(chains.len(), 2);
        assert!(chains[0].starts_with("[0:v]drawtext=text=late"));
        assert!(chains[0].ends_with("[sub1]"));
        assert!(chains[1].starts_with("[sub1]drawtext=text=early"));
        assert!(chains[1].ends_with("[sub2]"));
    }

    #[test]
    fn windows_are_half_open() {
        assert_eq!(enable_expr(1.0, 2.5), "gte(t,1.000)*lt(t,2.500)");
    }

    #[test]
    fn overlapping_entries_follow_their_windows() {
        // hello [0,2), world [1,3) on a 4 second clip
        let hello = entry("hello", 0.0, 2.0);
        let world = entry("world", 1.0, 3.0);

        let shown = |t: f64| (visible(&hello, t), visible(&world, t));
        assert_eq!(shown(0.5), (true, false));
        assert_eq!(shown(1.0), (true, true));
        assert_eq!(shown(1.5), (true, true));
        assert_eq!(shown(2.0), (false, true));
        assert_eq!(shown(2.5), (false, true));
        assert_eq!(shown(3.0), (false, false));
        assert_eq!(shown(3.5), (false, false));

        let rendered = overlay_graph(&[hello, world], &style()).render();
        assert!(rendered.contains("enable='gte(t,0.000)*lt(t,2.000)'[sub1]"));
        assert!(rendered.contains("[sub1]drawtext=text=world"));
        assert!(rendered.contains("enable='gte(t,1.000)*lt(t,3.000)'[sub2]"));
    }

    #[test]
    fn text_is_centred_at_fixed_bottom_offset() {
        let rendered = overlay_graph(&[entry("hi", 0.0, 1.0)], &style()).render();
        assert!(rendered.contains("x='(w-text_w)/2'"));
        assert!(rendered.contains("y='h-text_h-160'"));
        assert!(rendered.contains("expansion=none"));
    }

    #[test]
    fn quotes_in_text_cannot_break_out() {
        let rendered = overlay_graph(&[entry("don't; stop", 0.0, 1.0)], &style()).render();
        assert!(rendered.starts_with(r"[0:v]drawtext=text=don\\\'t\; stop:expansion=none"));
        assert_eq!(rendered.matches(';').count(), rendered.matches(r"\;").count());
    }

    #[test]
    fn font_file_is_passed_when_configured() {
        let mut style = style();
        style.font_file = Some(PathBuf::from("/fonts/Inter:Bold.ttf"));
        let rendered = overlay_graph(&[entry("hi", 0.0, 1.0)], &style).render();
        assert!(rendered.contains(r"fontfile=/fonts/Inter\\:Bold.ttf"));
    }

    #[test]
    fn invocation_maps_last_label_and_optional_audio() {
        let graph = overlay_graph(&[entry("a", 0.0, 1.0), entry("b", 1.0, 2.0)], &style());
        let args = invocation(Path::new("in.mp4"), Path::new("out.mp4"), graph)
            .build_args()
            .join(" ");
        assert!(args.contains("-map [sub2] -map 0:a? -c:v libx264"));
        assert!(args.contains("-c:a copy"));
    }

    #[tokio::test]
    async fn no_entries_pass_video_through() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path()).await;
        let scope = ws.scope().await.unwrap();
        let engine = RecordingEngine::new();
        let video = scope.path("joined.mp4");

        let out = burn_subtitles(&engine, &scope, video.clone(), &[], &style())
            .await
            .unwrap();
        assert_eq!(out, video);
        assert!(engine.stages().is_empty());
    }

    #[tokio::test]
    async fn engine_failure_is_an_overlay_error() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path()).await;
        let scope = ws.scope().await.unwrap();

        let err = burn_subtitles(
            &RecordingEngine::failing_at("overlay"),
            &scope,
            scope.path("joined.mp4"),
            &[entry("a", 0.0, 1.0)],
            &style(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Overlay(_)));
    }
}
