use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::navigation::{Navigator, Route};
use crate::services::{AuditService, AuthService, PersonaService};
use crate::session::{guard, FileStorage, GuardDecision, SessionMonitor, SessionStore, Storage};

pub const SESSION_FILE: &str = "session.json";

/// Everything one client instance needs, wired together once.
pub struct App {
    pub store: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub client: Arc<ApiClient>,
    pub auth: AuthService,
    pub personas: PersonaService,
    pub audits: AuditService,
    pub monitor: SessionMonitor,
}

impl App {
    pub fn new(
        storage: Arc<dyn Storage>,
        base_url: &str,
        timeout: Duration,
        monitor_interval: Duration,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(SessionStore::new(storage));
        let navigator = Arc::new(Navigator::new());
        let client = Arc::new(ApiClient::new(
            base_url,
            timeout,
            Arc::clone(&store),
            Arc::clone(&navigator),
        )?);

        Ok(Self {
            auth: AuthService::new(Arc::clone(&client)),
            personas: PersonaService::new(Arc::clone(&client)),
            audits: AuditService::new(Arc::clone(&client)),
            monitor: SessionMonitor::new(Arc::clone(&store), Arc::clone(&navigator), monitor_interval),
            store,
            navigator,
            client,
        })
    }

    /// Build from configuration with the session persisted under the config dir.
    /// `watch_storage` turns on change notifications for the session file,
    /// which only long-running commands need.
    pub fn from_config(config: &AppConfig, watch_storage: bool) -> anyhow::Result<Self> {
        let path = config.config_dir()?.join(SESSION_FILE);
        let storage = if watch_storage {
            FileStorage::open_watched(path, config.monitor_interval())?
        } else {
            FileStorage::open(path)?
        };
        Self::new(
            Arc::new(storage),
            &config.api.base_url,
            config.request_timeout(),
            config.monitor_interval(),
        )
    }

    /// Navigate to `route` through the session guard.
    pub fn enter(&self, route: Route) -> GuardDecision {
        guard::enter(route, &self.store, &self.navigator)
    }
}
