use crate::config::settings::AppConfig;
use crate::infrastructure::http::fetcher::Fetcher;
use crate::infrastructure::media::engine::MediaEngine;
use crate::infrastructure::storage::workspace::Workspace;
use crate::workers::cleanup::CleanupScheduler;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub workspace: Workspace,
    pub engine: Arc<dyn MediaEngine>,
    pub fetcher: Fetcher,
    pub cleanup: CleanupScheduler,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        workspace: Workspace,
        engine: Arc<dyn MediaEngine>,
        fetcher: Fetcher,
        cleanup: CleanupScheduler,
    ) -> Self {
        Self {
            config,
            workspace,
            engine,
            fetcher,
            cleanup,
        }
    }
}
