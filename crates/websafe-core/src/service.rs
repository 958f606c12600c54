//! Background service: the long-lived application context and its event loop.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::cache::AnalysisCache;
use crate::client::{Scorer, ScoringClient};
use crate::config::ServiceConfig;
use crate::error::{WebSafeError, WebSafeResult};
use crate::host::{ExtensionHost, KeyValueStore};
use crate::orchestrator::Orchestrator;
use crate::router::{Response, Router};
use crate::settings::Settings;
use crate::types::TabId;

/// Something the host wants the core to react to.
#[derive(Debug)]
pub enum HostEvent {
    /// Tab lifecycle notification.
    TabUpdated {
        tab_id: TabId,
        url: Option<String>,
        status: Option<String>,
    },
    /// Message from a content script or the popup.
    Message {
        message: Value,
        /// Where the reply goes, if the sender waits for one.
        reply: Option<oneshot::Sender<Option<Response>>>,
    },
}

/// Owns the orchestrator and router for the lifetime of the background context.
#[derive(Debug, Clone)]
pub struct BackgroundService {
    orchestrator: Arc<Orchestrator>,
    router: Router,
}

impl BackgroundService {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let router = Router::new(Arc::clone(&orchestrator));
        Self {
            orchestrator,
            router,
        }
    }

    /// Wire up the HTTP scorer and seed default settings.
    pub async fn start(
        config: &ServiceConfig,
        host: Arc<dyn ExtensionHost>,
        local: Arc<dyn KeyValueStore>,
        synced: Arc<dyn KeyValueStore>,
    ) -> WebSafeResult<Self> {
        let scorer: Arc<dyn Scorer> = Arc::new(ScoringClient::new(config)?);
        Ok(Self::start_with_scorer(config, scorer, host, local, synced).await)
    }

    pub async fn start_with_scorer(
        config: &ServiceConfig,
        scorer: Arc<dyn Scorer>,
        host: Arc<dyn ExtensionHost>,
        local: Arc<dyn KeyValueStore>,
        synced: Arc<dyn KeyValueStore>,
    ) -> Self {
        if let Err(e) = Settings::initialize_defaults(synced.as_ref()).await {
            error!(error = %e, "failed to initialize default settings");
        }

        let cache = AnalysisCache::new(config.cache_ttl());
        let orchestrator = Orchestrator::new(scorer, cache, host, local, synced);
        info!(ttl_secs = config.cache_ttl_secs, "background service started");
        Self::new(Arc::new(orchestrator))
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Handle one event to completion.
    pub async fn dispatch(&self, event: HostEvent) {
        match event {
            HostEvent::TabUpdated {
                tab_id,
                url,
                status,
            } => {
                let result = self
                    .orchestrator
                    .handle_tab_updated(tab_id, url.as_deref(), status.as_deref())
                    .await;
                if let Err(e) = result {
                    log_scan_failure(tab_id, &e);
                }
            }
            HostEvent::Message { message, reply } => {
                let response = self.router.handle_value(message).await;
                if let Some(reply) = reply {
                    if reply.send(response).is_err() {
                        debug!("message sender went away before the reply");
                    }
                }
            }
        }
    }

    /// Consume events until the channel closes, one task per event.
    ///
    /// Returns after every started task has finished.
    pub async fn run(self, mut events: mpsc::Receiver<HostEvent>) {
        let mut tasks = JoinSet::new();

        while let Some(event) = events.recv().await {
            let service = self.clone();
            tasks.spawn(async move { service.dispatch(event).await });

            // Reap finished tasks so the set does not grow with the session.
            while tasks.try_join_next().is_some() {}
        }

        while tasks.join_next().await.is_some() {}
        info!("event channel closed, background service stopped");
    }
}

fn log_scan_failure(tab_id: TabId, err: &WebSafeError) {
    match err {
        WebSafeError::Storage { .. } => error!(tab_id, error = %err, "tab state not recorded"),
        _ => error!(tab_id, error = %err, "tab scan failed"),
    }
}
