//! Message protocol between content scripts, popup and the background core.
//!
//! Requests are tagged by `action`. Only `analyzeUrl` produces a reply, and it
//! is delivered once the analysis is done. Unknown actions are dropped
//! silently: the same channel carries messages for other subsystems.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::orchestrator::Orchestrator;
use crate::types::Analysis;

/// Inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Full get-or-compute; replies with the analysis.
    AnalyzeUrl { url: String },
    /// Fire-and-forget analysis of a pasted link.
    QuickAnalyze { url: String },
    /// Ask the host to show the popup.
    OpenPopup,
    /// Any action this router does not own.
    #[serde(other)]
    Unknown,
}

/// Reply to a request that expects one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// `null` when the URL is not analyzable (non-web scheme).
    Analysis(Option<Analysis>),
}

/// Dispatches requests to the orchestrator.
#[derive(Debug, Clone)]
pub struct Router {
    orchestrator: Arc<Orchestrator>,
}

impl Router {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Handle a typed request. `None` means "no reply".
    pub async fn handle(&self, request: Request) -> Option<Response> {
        match request {
            Request::AnalyzeUrl { url } => {
                let analysis = self.orchestrator.handle_explicit_analyze(&url).await;
                Some(Response::Analysis(analysis))
            }
            Request::QuickAnalyze { url } => {
                // Detached on purpose: the sender gets no reply.
                drop(self.orchestrator.handle_quick_analyze(&url));
                None
            }
            Request::OpenPopup => {
                if let Err(e) = self.orchestrator.host().open_popup().await {
                    warn!(error = %e, "failed to open popup");
                }
                None
            }
            Request::Unknown => None,
        }
    }

    /// Handle a raw JSON message. Malformed messages are ignored like unknown ones.
    pub async fn handle_value(&self, message: Value) -> Option<Response> {
        match serde_json::from_value::<Request>(message) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                debug!(error = %e, "ignoring unparseable message");
                None
            }
        }
    }
}
