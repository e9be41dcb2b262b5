use crate::common::validation::{validate_output_name, validate_remote_url};
use crate::pipeline::overlay::SubtitleEntry;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_subtitle_window"))]
pub struct SubtitleRequest {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    /// Seconds from the start of the final video.
    #[validate(range(min = 0.0))]
    pub start: f64,
    pub end: f64,
}

fn validate_subtitle_window(subtitle: &SubtitleRequest) -> Result<(), ValidationError> {
    if subtitle.end > subtitle.start {
        Ok(())
    } else {
        Err(ValidationError::new("subtitle_window")
            .with_message(Cow::Borrowed("end must be greater than start")))
    }
}

impl From<SubtitleRequest> for SubtitleEntry {
    fn from(s: SubtitleRequest) -> Self {
        Self {
            text: s.text,
            start: s.start,
            end: s.end,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JoinRequest {
    /// Clip ids, media file names or media URLs, in playback order.
    #[validate(length(min = 1, max = 200, message = "between 1 and 200 clips are required"))]
    pub clips: Vec<String>,
    /// Optional voice-over mixed into the joined video.
    #[validate(custom(function = "validate_remote_url"))]
    pub audio_url: Option<String>,
    /// Applied in list order; later entries draw on top.
    #[serde(default)]
    #[validate(nested)]
    pub subtitles: Vec<SubtitleRequest>,
    #[validate(custom(function = "validate_output_name"))]
    pub output_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReelResponse {
    pub video_path: String,
    pub video_url: String,
    pub clip_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: OffsetDateTime,
}
