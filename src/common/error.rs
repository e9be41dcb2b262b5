//! Failure taxonomy of the composition pipeline and its HTTP translation.

use crate::common::response::{ApiResponse, ErrorDetail};
use crate::infrastructure::http::fetcher::FetchError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Invalid content from {url}: {reason}")]
    InvalidContent { url: String, reason: String },

    #[error("Clip render failed: {0}")]
    Render(String),

    #[error("Clip not found: {0}")]
    MissingClip(String),

    #[error("Clip concatenation failed: {0}")]
    Join(String),

    #[error("Failed to fetch audio: {0}")]
    AudioFetch(String),

    #[error("Audio mix failed: {0}")]
    Mix(String),

    #[error("Subtitle overlay failed: {0}")]
    Overlay(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline task failed: {0}")]
    Task(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Image fetch failures keep the transport/content distinction.
    pub fn from_image_fetch(err: FetchError) -> Self {
        let url = err.url().to_string();
        if err.is_content_error() {
            Self::InvalidContent {
                url,
                reason: err.to_string(),
            }
        } else {
            Self::Fetch {
                url,
                reason: err.to_string(),
            }
        }
    }

    /// Any audio fetch failure is reported as one kind.
    pub fn from_audio_fetch(err: FetchError) -> Self {
        Self::AudioFetch(err.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation_error",
            PipelineError::Fetch { .. } => "fetch_error",
            PipelineError::InvalidContent { .. } => "invalid_content_error",
            PipelineError::Render(_) => "render_error",
            PipelineError::MissingClip(_) => "missing_clip_error",
            PipelineError::Join(_) => "join_error",
            PipelineError::AudioFetch(_) => "audio_fetch_error",
            PipelineError::Mix(_) => "mix_error",
            PipelineError::Overlay(_) => "overlay_error",
            PipelineError::Io(_) => "io_error",
            PipelineError::Task(_) => "task_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::InvalidContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::MissingClip(_) => StatusCode::NOT_FOUND,
            PipelineError::Fetch { .. } | PipelineError::AudioFetch(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Render(_)
            | PipelineError::Join(_)
            | PipelineError::Mix(_)
            | PipelineError::Overlay(_)
            | PipelineError::Io(_)
            | PipelineError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for PipelineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), "❌ {}", self);
        }

        let detail = ErrorDetail {
            kind: self.kind().to_string(),
        };
        let body = ApiResponse::error_with(&self.to_string(), detail);

        (status, Json(body)).into_response()
    }
}
