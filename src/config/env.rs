use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    MediaDir,
    ScratchDir,
    PublicMediaPrefix,
    PublicBaseUrl,
    FfmpegBin,
    FfprobeBin,
    RetentionSecs,
    TargetWidth,
    TargetHeight,
    FitMode,
    ZoomMax,
    MaxClipSeconds,
    MinFetchBytes,
    MaxFetchBytes,
    FetchTimeoutSecs,
    SubtitleFontSize,
    SubtitleBottomOffset,
    SubtitleFontFile,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::MediaDir => "MEDIA_DIR",
            EnvKey::ScratchDir => "SCRATCH_DIR",
            EnvKey::PublicMediaPrefix => "PUBLIC_MEDIA_PREFIX",
            EnvKey::PublicBaseUrl => "PUBLIC_BASE_URL",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::FfprobeBin => "FFPROBE_BIN",
            EnvKey::RetentionSecs => "RETENTION_SECS",
            EnvKey::TargetWidth => "TARGET_WIDTH",
            EnvKey::TargetHeight => "TARGET_HEIGHT",
            EnvKey::FitMode => "FIT_MODE",
            EnvKey::ZoomMax => "ZOOM_MAX",
            EnvKey::MaxClipSeconds => "MAX_CLIP_SECONDS",
            EnvKey::MinFetchBytes => "MIN_FETCH_BYTES",
            EnvKey::MaxFetchBytes => "MAX_FETCH_BYTES",
            EnvKey::FetchTimeoutSecs => "FETCH_TIMEOUT_SECS",
            EnvKey::SubtitleFontSize => "SUBTITLE_FONT_SIZE",
            EnvKey::SubtitleBottomOffset => "SUBTITLE_BOTTOM_OFFSET",
            EnvKey::SubtitleFontFile => "SUBTITLE_FONT_FILE",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Empty values count as unset.
pub fn get_optional(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
