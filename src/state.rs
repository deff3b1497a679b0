use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::export::{Exporter, RenderPrimitive, TypstRenderEngine};
use crate::workspace::Workspace;

/// Shared across workers through `web::Data`.
///
/// The workspace mutex is never held across an `.await`; the exporter takes
/// it only to validate and snapshot.
pub struct AppState {
    pub config: AppConfig,
    pub workspace: Mutex<Workspace>,
    pub exporter: Exporter,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let engine = TypstRenderEngine::new(config.typst_bin.clone(), config.output_dir.clone());
        Self::with_renderer(config, Arc::new(engine))
    }

    pub fn with_renderer(config: AppConfig, renderer: Arc<dyn RenderPrimitive>) -> Self {
        let exporter = Exporter::new(renderer, config.documents.clone());
        Self {
            config,
            workspace: Mutex::new(Workspace::new()),
            exporter,
        }
    }
}
