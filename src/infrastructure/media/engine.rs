use super::command::FfmpegInvocation;
use super::filter_graph::FilterChain;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Lines of stderr kept when an encoder run fails.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} exited with status {code:?}: {stderr}")]
    Failed {
        stage: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// The external media engine. Everything the pipeline asks of ffmpeg goes
/// through here.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    async fn run(&self, invocation: &FfmpegInvocation) -> Result<(), EngineError>;

    /// Whether the file carries at least one audio stream.
    async fn has_audio(&self, path: &Path) -> Result<bool, EngineError>;
}

pub struct FfmpegEngine {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegEngine {
    pub fn new(ffmpeg_bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
        }
    }

    /// Log the engine version, or warn when the binary is unusable.
    pub async fn log_version(&self) {
        match Command::new(&self.ffmpeg_bin)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                info!("🎥 {}", stdout.lines().next().unwrap_or("ffmpeg (unknown version)"));
            }
            Ok(output) => warn!("{} -version exited with {}", self.ffmpeg_bin, output.status),
            Err(e) => warn!("{} is not runnable: {}", self.ffmpeg_bin, e),
        }
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn run(&self, invocation: &FfmpegInvocation) -> Result<(), EngineError> {
        let args = invocation.build_args();
        let chains: Vec<&str> = invocation
            .graph()
            .map(|g| g.chains().iter().map(FilterChain::stage).collect())
            .unwrap_or_default();
        debug!(
            stage = invocation.stage(),
            chains = ?chains,
            "Running {} {}",
            self.ffmpeg_bin,
            args.join(" ")
        );

        let output = Command::new(&self.ffmpeg_bin)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                binary: self.ffmpeg_bin.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = stderr_tail(&output.stderr);
        error!(
            stage = invocation.stage(),
            code = ?output.status.code(),
            "FFmpeg failed writing {}: {}",
            invocation.output().display(),
            stderr
        );
        Err(EngineError::Failed {
            stage: invocation.stage().to_string(),
            code: output.status.code(),
            stderr,
        })
    }

    async fn has_audio(&self, path: &Path) -> Result<bool, EngineError> {
        let output = Command::new(&self.ffprobe_bin)
            .args(["-v", "error", "-select_streams", "a", "-show_entries", "stream=index", "-of", "csv=p=0"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                binary: self.ffprobe_bin.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                stage: "probe".to_string(),
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
