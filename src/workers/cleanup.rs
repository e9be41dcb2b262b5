use futures_util::StreamExt;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::fs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::time::{delay_queue, DelayQueue};
use tracing::{debug, info, warn};

#[derive(Debug)]
struct CleanupTask {
    path: PathBuf,
    delay: Duration,
}

/// Handle for registering artifacts for delayed removal.
///
/// Scheduling never blocks and never fails from the caller's point of view.
/// The schedule lives only in memory, so pending removals are lost on restart.
#[derive(Clone)]
pub struct CleanupScheduler {
    tx: mpsc::UnboundedSender<CleanupTask>,
    retention: Duration,
}

impl CleanupScheduler {
    /// Spawn the background worker. It keeps running until every handle is
    /// dropped and all pending deadlines have fired.
    pub fn start(retention: Duration) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_cleanup_worker(rx));
        (Self { tx, retention }, handle)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Remove `path` once the retention window has elapsed. Returns the
    /// expiry time.
    pub fn schedule(&self, path: impl Into<PathBuf>) -> OffsetDateTime {
        self.schedule_after(path, self.retention)
    }

    /// Registering a path that is already pending moves its deadline.
    pub fn schedule_after(&self, path: impl Into<PathBuf>, delay: Duration) -> OffsetDateTime {
        let path = path.into();
        debug!("Scheduling removal of {} in {:?}", path.display(), delay);

        if let Err(e) = self.tx.send(CleanupTask { path, delay }) {
            warn!(
                "Cleanup worker is gone, {} will not be removed",
                e.0.path.display()
            );
        }

        OffsetDateTime::now_utc() + delay
    }
}

async fn run_cleanup_worker(mut rx: mpsc::UnboundedReceiver<CleanupTask>) {
    info!("🧹 Cleanup worker started");

    let mut queue: DelayQueue<PathBuf> = DelayQueue::new();
    let mut pending: HashMap<PathBuf, delay_queue::Key> = HashMap::new();
    let mut accepting = true;

    loop {
        tokio::select! {
            task = rx.recv(), if accepting => match task {
                Some(task) => match pending.get(&task.path) {
                    Some(key) => queue.reset(key, task.delay),
                    None => {
                        let key = queue.insert(task.path.clone(), task.delay);
                        pending.insert(task.path, key);
                    }
                },
                None => {
                    debug!("All cleanup handles dropped, draining {} pending removals", pending.len());
                    accepting = false;
                }
            },
            Some(expired) = queue.next(), if !queue.is_empty() => {
                let path = expired.into_inner();
                pending.remove(&path);
                remove_artifact(&path).await;
            }
            else => break,
        }
    }

    info!("🧹 Cleanup worker stopped");
}

/// Best-effort removal of a file or directory tree. Never fails.
pub async fn remove_artifact(path: &Path) {
    let result = match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).await,
        Ok(_) => fs::remove_file(path).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => info!("🧹 Removed expired artifact {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} already gone", path.display())
        }
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
