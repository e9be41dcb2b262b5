use crate::common::validation::{validate_artifact_id, validate_remote_url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn default_length() -> f64 {
    10.0
}

fn default_frame_rate() -> u32 {
    25
}

fn default_zoom_speed() -> f64 {
    3.0
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_frame_count"))]
pub struct GenerateClipRequest {
    /// Still image to animate.
    #[validate(custom(function = "validate_remote_url"))]
    pub image_url: String,
    /// Clip duration in seconds.
    #[serde(default = "default_length")]
    #[validate(range(exclusive_min = 0.0, message = "length must be positive"))]
    pub length: f64,
    #[serde(default = "default_frame_rate")]
    #[validate(range(min = 1, max = 120, message = "frame_rate must be between 1 and 120"))]
    pub frame_rate: u32,
    /// Zoom added per frame, in thousandths.
    #[serde(default = "default_zoom_speed")]
    #[validate(range(min = 0.0, max = 100.0, message = "zoom_speed must be between 0 and 100"))]
    pub zoom_speed: f64,
    #[validate(custom(function = "validate_artifact_id"))]
    pub id: Option<String>,
}

/// A clip must hold at least one whole frame.
fn validate_frame_count(req: &GenerateClipRequest) -> Result<(), ValidationError> {
    if req.length * f64::from(req.frame_rate) >= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::new("frame_count")
            .with_message(Cow::Borrowed("length is shorter than one frame at frame_rate")))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClipResponse {
    pub id: String,
    pub video_path: String,
    pub video_url: String,
    pub duration: f64,
    pub frame_rate: u32,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: OffsetDateTime,
}
