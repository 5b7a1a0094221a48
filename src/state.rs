use std::sync::Arc;

use crate::auth::SessionStore;
use crate::client::PostalLookup;
use crate::config::AppConfig;
use crate::database::Store;

/// Dependencies shared by every handler, built once by the composition root.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionStore>,
    pub postal: Arc<PostalLookup>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        sessions: Arc<dyn SessionStore>,
        postal: PostalLookup,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            postal: Arc::new(postal),
            config: Arc::new(config),
        }
    }
}
