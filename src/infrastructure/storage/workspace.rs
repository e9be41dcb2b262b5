//! Filesystem layout for one service instance.
//!
//! Intermediate files live in per-request scopes under the scratch root;
//! artifacts handed to callers live flat in the media root, which is served
//! statically.

use crate::common::error::{PipelineError, PipelineResult};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Workspace {
    scratch_root: PathBuf,
    media_root: PathBuf,
    public_prefix: String,
}

impl Workspace {
    pub async fn init(
        scratch_root: impl Into<PathBuf>,
        media_root: impl Into<PathBuf>,
        public_prefix: &str,
    ) -> io::Result<Self> {
        let scratch_root = scratch_root.into();
        let media_root = media_root.into();

        fs::create_dir_all(&scratch_root).await?;
        fs::create_dir_all(&media_root).await?;

        info!(
            "📁 Workspace ready (scratch: {}, media: {})",
            scratch_root.display(),
            media_root.display()
        );

        Ok(Self {
            scratch_root,
            media_root,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Allocate a fresh, uniquely named scratch directory.
    pub async fn scope(&self) -> io::Result<RequestScope> {
        let dir = self.scratch_root.join(Uuid::new_v4().simple().to_string());
        fs::create_dir(&dir).await?;
        debug!("Allocated scratch scope {}", dir.display());
        Ok(RequestScope { dir })
    }

    /// Location of a published artifact. `file_name` must already be a bare
    /// file name.
    pub fn media_path(&self, file_name: &str) -> PathBuf {
        self.media_root.join(file_name)
    }

    /// Resolve a caller supplied clip reference to a path inside the media
    /// root. Accepts a clip id (`intro`), a file name (`intro.mp4`) or a
    /// public path (`/media/intro.mp4`, optionally with an origin).
    pub fn resolve_clip(&self, reference: &str) -> PipelineResult<PathBuf> {
        let trimmed = reference.trim();
        let without_origin = match trimmed.find("://") {
            Some(idx) => {
                let rest = &trimmed[idx + 3..];
                rest.find('/').map(|slash| &rest[slash..]).unwrap_or("")
            }
            None => trimmed,
        };
        let prefix = format!("{}/", self.public_prefix);
        let relative = without_origin
            .strip_prefix(prefix.as_str())
            .unwrap_or(without_origin)
            .trim_start_matches('/');

        let file_name = bare_file_name(relative).ok_or_else(|| {
            PipelineError::validation(format!("invalid clip reference: {:?}", reference))
        })?;

        let file_name = if Path::new(file_name).extension().is_some() {
            file_name.to_string()
        } else {
            format!("{}.mp4", file_name)
        };

        Ok(self.media_root.join(file_name))
    }
}

/// Returns `candidate` if it names a single normal path component.
pub fn bare_file_name(candidate: &str) -> Option<&str> {
    if candidate.is_empty() || candidate.contains('\\') {
        return None;
    }
    let mut components = Path::new(candidate).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(candidate),
        _ => None,
    }
}

/// Scratch directory owned by one request.
#[derive(Debug)]
pub struct RequestScope {
    dir: PathBuf,
}

impl RequestScope {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Remove the scope and everything in it. Missing directories are fine.
    pub async fn teardown(self) -> io::Result<()> {
        match fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Teardown that only logs failures. The scope is also registered for
    /// delayed cleanup, so nothing is lost if this fails.
    pub async fn release(self) {
        let dir = self.dir.clone();
        if let Err(e) = self.teardown().await {
            warn!("Failed to tear down scratch scope {}: {}", dir.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::workspace;

    #[tokio::test]
    async fn scopes_are_unique_and_tear_down() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path()).await;

        let a = ws.scope().await.unwrap();
        let b = ws.scope().await.unwrap();
        assert_ne!(a.dir(), b.dir());
        assert!(a.dir().starts_with(root.path().join("scratch")));

        std::fs::write(a.path("source.jpg"), b"x").unwrap();
        let dir = a.dir().to_path_buf();
        a.teardown().await.unwrap();
        assert!(!dir.exists());
        assert!(b.dir().exists());
    }

    #[tokio::test]
    async fn teardown_of_vanished_scope_is_ok() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path()).await;
        let scope = ws.scope().await.unwrap();
        std::fs::remove_dir_all(scope.dir()).unwrap();
        scope.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn clip_references_resolve_into_media_root() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path()).await;
        let expected = root.path().join("media").join("intro.mp4");

        assert_eq!(ws.resolve_clip("intro").unwrap(), expected);
        assert_eq!(ws.resolve_clip("intro.mp4").unwrap(), expected);
        assert_eq!(ws.resolve_clip("/media/intro.mp4").unwrap(), expected);
        assert_eq!(
            ws.resolve_clip("http://localhost:3000/media/intro.mp4").unwrap(),
            expected
        );
    }

    #[tokio::test]
    async fn clip_references_cannot_escape_media_root() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path()).await;

        for bad in ["../secret.mp4", "/etc/passwd", "a/b.mp4", "..", "", "/media/", "a\\b"] {
            assert!(
                matches!(ws.resolve_clip(bad), Err(PipelineError::Validation(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn bare_file_names() {
        assert_eq!(bare_file_name("final.mp4"), Some("final.mp4"));
        assert_eq!(bare_file_name("./final.mp4"), None);
        assert_eq!(bare_file_name("dir/final.mp4"), None);
    }
}
