use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::services::MovieCatalog;
use crate::session::SessionManager;

/// Everything a request handler needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionManager,
    pub catalog: Arc<dyn MovieCatalog>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        db: Database,
        sessions: SessionManager,
        catalog: Arc<dyn MovieCatalog>,
        config: Config,
    ) -> Self {
        Self {
            db,
            sessions,
            catalog,
            config: Arc::new(config),
        }
    }
}
