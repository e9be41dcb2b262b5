//! Composition stages. Each stage reads files and writes exactly one output
//! file through the [`MediaEngine`](crate::infrastructure::media::engine::MediaEngine).

pub mod join;
pub mod mix;
pub mod overlay;
pub mod render;

use crate::common::error::{PipelineError, PipelineResult};
use std::future::Future;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Run a pipeline on its own task. Once started it runs to completion even
/// if the caller goes away.
pub async fn detached<F, T>(pipeline: F) -> PipelineResult<T>
where
    F: Future<Output = PipelineResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(pipeline)
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
}

/// True when `path` exists and holds at least one byte.
pub async fn has_content(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Move a finished artifact into place, copying when the rename crosses
/// filesystems.
pub async fn publish(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Cross-device rename, copying {} -> {}",
                src.display(),
                dst.display()
            );
            fs::copy(src, dst).await?;
            fs::remove_file(src).await
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detached_pipeline_result_is_returned() {
        let ok = detached(async { Ok::<_, PipelineError>(7) }).await.unwrap();
        assert_eq!(ok, 7);

        let err = detached(async { Err::<(), _>(PipelineError::Render("boom".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Render(_)));
    }

    #[tokio::test]
    async fn panicking_pipeline_becomes_task_error() {
        let err = detached(async {
            if true {
                panic!("stage bug");
            }
            Ok::<(), PipelineError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Task(_)));
    }

    #[tokio::test]
    async fn content_check_rejects_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.mp4");
        let full = dir.path().join("full.mp4");
        std::fs::write(&empty, b"").unwrap();
        std::fs::write(&full, b"x").unwrap();

        assert!(!has_content(&dir.path().join("missing.mp4")).await);
        assert!(!has_content(&empty).await);
        assert!(!has_content(dir.path()).await);
        assert!(has_content(&full).await);
    }

    #[tokio::test]
    async fn publish_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("stage.mp4");
        let dst = dir.path().join("final.mp4");
        std::fs::write(&src, b"video").unwrap();

        publish(&src, &dst).await.unwrap();
        assert!(!src.exists());
        assert_eq!(std::fs::read(dst).unwrap(), b"video");
    }
}
