use crate::config::settings::FetchSettings;
use futures_util::StreamExt;
use reqwest::{header, Client};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned an empty body")]
    Empty { url: String },

    #[error("{url} returned {size} bytes, below the {min} byte minimum")]
    TooSmall { url: String, size: usize, min: usize },

    #[error("{url} exceeded the {max} byte limit")]
    TooLarge { url: String, max: usize },

    #[error("{url} returned {content_type}, not media")]
    NotMedia { url: String, content_type: String },

    #[error("failed to write {url} to disk: {source}")]
    Write {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Empty { url }
            | FetchError::TooSmall { url, .. }
            | FetchError::TooLarge { url, .. }
            | FetchError::NotMedia { url, .. }
            | FetchError::Write { url, .. } => url,
        }
    }

    /// True when the transfer worked but the payload is not plausible media.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            FetchError::Empty { .. }
                | FetchError::TooSmall { .. }
                | FetchError::TooLarge { .. }
                | FetchError::NotMedia { .. }
        )
    }
}

/// Downloads remote media into local scratch files. Never retries.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    min_bytes: usize,
    max_bytes: usize,
}

impl Fetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("reelsmith/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            min_bytes: settings.min_bytes,
            max_bytes: settings.max_bytes,
        })
    }

    /// Fetch `url` into `dest`. The file is only written once the whole
    /// payload has been received and judged plausible.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        debug!("⬇️ Fetching {} -> {}", url, dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if is_text_payload(content_type) {
                return Err(FetchError::NotMedia {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let mut payload = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            if payload.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    max: self.max_bytes,
                });
            }
            payload.extend_from_slice(&chunk);
        }

        if payload.is_empty() {
            return Err(FetchError::Empty {
                url: url.to_string(),
            });
        }
        if payload.len() < self.min_bytes {
            return Err(FetchError::TooSmall {
                url: url.to_string(),
                size: payload.len(),
                min: self.min_bytes,
            });
        }

        tokio::fs::write(dest, &payload)
            .await
            .map_err(|source| FetchError::Write {
                url: url.to_string(),
                source,
            })?;

        info!("⬇️ Downloaded {} bytes from {}", payload.len(), url);
        Ok(payload.len() as u64)
    }
}

/// Local file name for a fetched resource, keeping the URL's extension when
/// it looks like one.
pub fn scratch_name(stem: &str, url: &str, fallback_ext: &str) -> String {
    let ext = url::Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments().and_then(|s| s.last()).map(str::to_string))
        .and_then(|last| {
            Path::new(&last)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| fallback_ext.to_string());

    format!("{}.{}", stem, ext)
}

/// HTML or plain text bodies are error pages, not images or audio.
fn is_text_payload(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.type_() == mime::TEXT)
        .unwrap_or(false)
}
