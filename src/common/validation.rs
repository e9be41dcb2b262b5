use std::borrow::Cow;
use validator::ValidationError;

const MAX_ID_LEN: usize = 64;
const MAX_FILE_NAME_LEN: usize = 100;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Absolute http(s) URL.
pub fn validate_remote_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(invalid("remote_url", "must be an absolute http(s) URL")),
    }
}

/// Caller supplied artifact id: `[A-Za-z0-9_-]{1,64}`.
pub fn validate_artifact_id(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value.len() <= MAX_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(invalid("artifact_id", "must be 1-64 characters of A-Z, a-z, 0-9, '-' or '_'"))
    }
}

/// Output file name: a bare name, optionally ending in `.mp4`.
pub fn validate_output_name(value: &str) -> Result<(), ValidationError> {
    let stem = value.strip_suffix(".mp4").unwrap_or(value);
    let ok = !stem.is_empty()
        && value.len() <= MAX_FILE_NAME_LEN
        && !stem.starts_with('.')
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(invalid("output_name", "must be a plain file name, optionally ending in .mp4"))
    }
}
