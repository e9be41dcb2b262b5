use crate::config::env::{self, EnvKey};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// How a source image is brought to the exact target frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FitMode {
    /// Scale down to fit, then pad with black bars.
    #[default]
    Pad,
    /// Scale up to cover, then crop the overflow.
    Crop,
}

impl FromStr for FitMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pad" => Ok(FitMode::Pad),
            "crop" => Ok(FitMode::Crop),
            other => Err(ConfigError::Invalid {
                key: EnvKey::FitMode.as_str(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitMode::Pad => f.write_str("pad"),
            FitMode::Crop => f.write_str("crop"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub fit_mode: FitMode,
    pub zoom_max: f64,
    pub max_clip_seconds: f64,
}

#[derive(Clone, Debug)]
pub struct SubtitleStyle {
    pub font_size: u32,
    pub bottom_offset: u32,
    pub font_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct FetchSettings {
    pub min_bytes: usize,
    pub max_bytes: usize,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub media_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub public_media_prefix: String,
    pub public_base_url: Option<String>,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub retention: Duration,
    pub render: RenderSettings,
    pub subtitles: SubtitleStyle,
    pub fetch: FetchSettings,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let fit_mode = match env::get_optional(EnvKey::FitMode) {
            Some(raw) => raw.parse()?,
            None => FitMode::default(),
        };

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            media_dir: PathBuf::from(env::get_or(EnvKey::MediaDir, "./media")),
            scratch_dir: PathBuf::from(env::get_or(EnvKey::ScratchDir, "./scratch")),
            public_media_prefix: normalize_prefix(&env::get_or(EnvKey::PublicMediaPrefix, "/media")),
            public_base_url: env::get_optional(EnvKey::PublicBaseUrl)
                .map(|url| url.trim_end_matches('/').to_string()),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            ffprobe_bin: env::get_or(EnvKey::FfprobeBin, "ffprobe"),
            retention: Duration::from_secs(env::get_parsed(EnvKey::RetentionSecs, 3600)),
            render: RenderSettings {
                width: env::get_parsed(EnvKey::TargetWidth, 720),
                height: env::get_parsed(EnvKey::TargetHeight, 1280),
                fit_mode,
                zoom_max: env::get_parsed(EnvKey::ZoomMax, 1.5),
                max_clip_seconds: env::get_parsed(EnvKey::MaxClipSeconds, 120.0),
            },
            subtitles: SubtitleStyle {
                font_size: env::get_parsed(EnvKey::SubtitleFontSize, 56),
                bottom_offset: env::get_parsed(EnvKey::SubtitleBottomOffset, 160),
                font_file: env::get_optional(EnvKey::SubtitleFontFile).map(PathBuf::from),
            },
            fetch: FetchSettings {
                min_bytes: env::get_parsed(EnvKey::MinFetchBytes, 512),
                max_bytes: env::get_parsed(EnvKey::MaxFetchBytes, 100 * 1024 * 1024),
                timeout: Duration::from_secs(env::get_parsed(EnvKey::FetchTimeoutSecs, 60)),
            },
        })
    }

    /// Public URL for a published artifact file name.
    pub fn public_url(&self, file_name: &str) -> String {
        let base = self.public_base_url.as_deref().unwrap_or("");
        format!("{}{}/{}", base, self.public_media_prefix, file_name)
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/media".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_mode_parses_case_insensitively() {
        assert_eq!("PAD".parse::<FitMode>().unwrap(), FitMode::Pad);
        assert_eq!(" crop ".parse::<FitMode>().unwrap(), FitMode::Crop);
        assert!("stretch".parse::<FitMode>().is_err());
    }

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(normalize_prefix("media/"), "/media");
        assert_eq!(normalize_prefix("/static/out"), "/static/out");
        assert_eq!(normalize_prefix("/"), "/media");
    }

    #[test]
    fn public_url_joins_base_prefix_and_file() {
        let mut config = crate::test_support::config(std::path::Path::new("/tmp/x"));
        assert_eq!(config.public_url("a.mp4"), "/media/a.mp4");

        config.public_base_url = Some("https://cdn.example.com".to_string());
        assert_eq!(config.public_url("a.mp4"), "https://cdn.example.com/media/a.mp4");
    }
}
