//! Still image to vertical clip with a centred Ken Burns zoom.

use crate::common::error::{PipelineError, PipelineResult};
use crate::config::settings::{FitMode, RenderSettings};
use crate::infrastructure::media::command::FfmpegInvocation;
use crate::infrastructure::media::engine::MediaEngine;
use crate::infrastructure::media::filter_graph::{Filter, FilterChain, FilterGraph};
use std::path::Path;
use tracing::info;

/// `zoom_speed` is given in thousandths of zoom per frame.
const ZOOM_SPEED_UNIT: f64 = 0.001;

/// Crop window origin keeping the image centre fixed at any zoom.
const CENTER_X: &str = "iw/2-(iw/zoom/2)";
const CENTER_Y: &str = "ih/2-(ih/zoom/2)";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomPlan {
    step: f64,
    cap: f64,
}

impl ZoomPlan {
    pub fn new(zoom_speed: f64, cap: f64) -> Self {
        Self {
            step: zoom_speed.max(0.0) * ZOOM_SPEED_UNIT,
            cap: cap.max(1.0),
        }
    }

    pub fn is_static(&self) -> bool {
        self.step == 0.0
    }

    /// Zoom factor applied to frame `frame` (0-based).
    pub fn factor_at(&self, frame: u64) -> f64 {
        (1.0 + frame as f64 * self.step).min(self.cap)
    }

    /// Per-frame zoom expression, indexed by the output frame number `on`.
    /// Every looped input frame starts zoompan over at zoom 1, so the factor
    /// is computed from the frame index and equals `factor_at(on)`.
    pub fn expression(&self) -> String {
        if self.is_static() {
            "1".to_string()
        } else {
            format!("min(1+on*{:.6},{:.4})", self.step, self.cap)
        }
    }
}

/// Everything needed to render one clip.
#[derive(Clone, Debug)]
pub struct ClipSpec {
    pub duration: f64,
    pub frame_rate: u32,
    pub zoom: ZoomPlan,
    pub width: u32,
    pub height: u32,
    pub fit_mode: FitMode,
}

impl ClipSpec {
    pub fn new(duration: f64, frame_rate: u32, zoom_speed: f64, settings: &RenderSettings) -> Self {
        Self {
            duration,
            frame_rate,
            zoom: ZoomPlan::new(zoom_speed, settings.zoom_max),
            width: settings.width,
            height: settings.height,
            fit_mode: settings.fit_mode,
        }
    }

    pub fn total_frames(&self) -> u64 {
        (self.duration * self.frame_rate as f64).round() as u64
    }
}

pub fn filter_graph(spec: &ClipSpec) -> FilterGraph {
    let (w, h) = (spec.width, spec.height);

    let fit = match spec.fit_mode {
        FitMode::Pad => FilterChain::new("fit")
            .filter(
                Filter::new("scale")
                    .arg("w", w)
                    .arg("h", h)
                    .arg("force_original_aspect_ratio", "decrease"),
            )
            .filter(
                Filter::new("pad")
                    .arg("w", w)
                    .arg("h", h)
                    .expr("x", "(ow-iw)/2")
                    .expr("y", "(oh-ih)/2")
                    .arg("color", "black"),
            ),
        FitMode::Crop => FilterChain::new("fit")
            .filter(
                Filter::new("scale")
                    .arg("w", w)
                    .arg("h", h)
                    .arg("force_original_aspect_ratio", "increase"),
            )
            .filter(Filter::new("crop").arg("w", w).arg("h", h)),
    };

    let chain = fit
        .filter(Filter::new("setsar").arg("sar", 1))
        .filter(
            Filter::new("zoompan")
                .expr("z", spec.zoom.expression())
                .arg("d", 1)
                .expr("x", CENTER_X)
                .expr("y", CENTER_Y)
                .arg("s", format!("{}x{}", w, h))
                .arg("fps", spec.frame_rate),
        )
        .filter(Filter::new("format").arg("pix_fmts", "yuv420p"));

    FilterGraph::new().chain(chain)
}

pub fn invocation(image: &Path, output: &Path, spec: &ClipSpec) -> FfmpegInvocation {
    let rate = spec.frame_rate.to_string();

    FfmpegInvocation::new("render", output)
        .input_with(["-loop", "1", "-framerate", rate.as_str()], image)
        .video_filter(filter_graph(spec))
        .duration(spec.duration)
        .output_args(["-r", rate.as_str()])
        .video_codec("libx264")
        .output_args(["-preset", "veryfast"])
        .pixel_format("yuv420p")
        .output_arg("-an")
        .faststart()
}

/// Render `image` into `output`. Leaves any partial output in place.
pub async fn render_clip(
    engine: &dyn MediaEngine,
    image: &Path,
    output: &Path,
    spec: &ClipSpec,
) -> PipelineResult<()> {
    let total_frames = spec.total_frames();
    info!(
        "🎬 Rendering {} frames at {}fps, zoom 1.0 -> {:.3}",
        total_frames,
        spec.frame_rate,
        spec.zoom.factor_at(total_frames.saturating_sub(1))
    );

    engine
        .run(&invocation(image, output, spec))
        .await
        .map_err(|e| PipelineError::Render(e.to_string()))?;

    if !super::has_content(output).await {
        return Err(PipelineError::Render(format!(
            "encoder produced no output at {}",
            output.display()
        )));
    }

    Ok(())
}
