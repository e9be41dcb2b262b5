//! Shared fixtures for unit and router tests.

use crate::config::settings::{AppConfig, FetchSettings, FitMode, RenderSettings, SubtitleStyle};
use crate::infrastructure::http::fetcher::Fetcher;
use crate::infrastructure::media::command::FfmpegInvocation;
use crate::infrastructure::media::engine::{EngineError, MediaEngine};
use crate::infrastructure::storage::workspace::Workspace;
use crate::state::AppState;
use crate::workers::cleanup::CleanupScheduler;
use async_trait::async_trait;
use axum::{http::header, routing::get, Router};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every invocation instead of running ffmpeg. By default it writes a
/// small placeholder to each output so content checks pass.
pub struct RecordingEngine {
    invocations: Mutex<Vec<FfmpegInvocation>>,
    fail_stage: Option<&'static str>,
    writes_output: bool,
    audio: bool,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            fail_stage: None,
            writes_output: true,
            audio: false,
        }
    }

    /// Succeeds but leaves no output behind.
    pub fn silent() -> Self {
        Self {
            writes_output: false,
            ..Self::new()
        }
    }

    pub fn failing_at(stage: &'static str) -> Self {
        Self {
            fail_stage: Some(stage),
            ..Self::new()
        }
    }

    pub fn with_audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }

    pub fn stages(&self) -> Vec<&'static str> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(FfmpegInvocation::stage)
            .collect()
    }

    pub fn invocations(&self) -> Vec<FfmpegInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaEngine for RecordingEngine {
    async fn run(&self, invocation: &FfmpegInvocation) -> Result<(), EngineError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        if self.fail_stage == Some(invocation.stage()) {
            // Like a real encoder, a failed run leaves a truncated file behind.
            tokio::fs::write(invocation.output(), b"").await.unwrap();
            return Err(EngineError::Failed {
                stage: invocation.stage().to_string(),
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }
        if self.writes_output {
            tokio::fs::write(invocation.output(), b"fake media").await.unwrap();
        }
        Ok(())
    }

    async fn has_audio(&self, _path: &Path) -> Result<bool, EngineError> {
        Ok(self.audio)
    }
}

pub fn fetch_settings() -> FetchSettings {
    FetchSettings {
        min_bytes: 512,
        max_bytes: 1024 * 1024,
        timeout: Duration::from_secs(5),
    }
}

pub fn config(root: &Path) -> AppConfig {
    AppConfig {
        server_port: 0,
        media_dir: root.join("media"),
        scratch_dir: root.join("scratch"),
        public_media_prefix: "/media".to_string(),
        public_base_url: None,
        ffmpeg_bin: "ffmpeg".to_string(),
        ffprobe_bin: "ffprobe".to_string(),
        retention: Duration::from_secs(3600),
        render: RenderSettings {
            width: 720,
            height: 1280,
            fit_mode: FitMode::Pad,
            zoom_max: 1.5,
            max_clip_seconds: 120.0,
        },
        subtitles: SubtitleStyle {
            font_size: 56,
            bottom_offset: 160,
            font_file: None,
        },
        fetch: fetch_settings(),
    }
}

pub async fn workspace(root: &Path) -> Workspace {
    Workspace::init(root.join("scratch"), root.join("media"), "/media")
        .await
        .unwrap()
}

pub async fn app_state(root: &Path, engine: Arc<RecordingEngine>) -> AppState {
    app_state_with_retention(root, engine, Duration::from_secs(3600)).await
}

pub async fn app_state_with_retention(
    root: &Path,
    engine: Arc<RecordingEngine>,
    retention: Duration,
) -> AppState {
    let mut config = config(root);
    config.retention = retention;
    let workspace = workspace(root).await;
    let fetcher = Fetcher::new(&config.fetch).unwrap();
    let (cleanup, _worker) = CleanupScheduler::start(config.retention);
    AppState::new(config, workspace, engine, fetcher, cleanup)
}

/// Serve `body` at `path` on an ephemeral local port and return its URL.
pub async fn serve_bytes(path: &str, content_type: &'static str, body: Vec<u8>) -> String {
    let app = Router::new().route(
        path,
        get(move || {
            let body = body.clone();
            async move { ([(header::CONTENT_TYPE, content_type)], body) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}{}", addr, path)
}
