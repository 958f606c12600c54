//! Host side of the line protocol used by `websafe serve`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use websafe_core::{BadgeState, ExtensionHost, Response, TabId, WebSafeError, WebSafeResult};

/// One line read from stdin.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum InputLine {
    #[serde(rename_all = "camelCase")]
    TabUpdated {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        status: Option<String>,
    },
    /// `id` present means the sender waits for a reply.
    Message {
        #[serde(default)]
        id: Option<Value>,
        message: Value,
    },
}

/// One line written to stdout.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutputLine {
    Reply {
        id: Value,
        response: Option<Response>,
    },
    #[serde(rename_all = "camelCase")]
    Badge { tab_id: TabId, badge: BadgeState },
    OpenPopup,
}

/// Forwards UI requests to the stdout writer.
#[derive(Debug, Clone)]
pub struct LineHost {
    out: mpsc::UnboundedSender<OutputLine>,
}

impl LineHost {
    pub fn new(out: mpsc::UnboundedSender<OutputLine>) -> Self {
        Self { out }
    }

    fn emit(&self, line: OutputLine) -> WebSafeResult<()> {
        self.out.send(line).map_err(|_| WebSafeError::Host {
            message: "output closed".to_string(),
        })
    }
}

#[async_trait]
impl ExtensionHost for LineHost {
    async fn set_badge(&self, tab_id: TabId, badge: &BadgeState) -> WebSafeResult<()> {
        self.emit(OutputLine::Badge {
            tab_id,
            badge: badge.clone(),
        })
    }

    async fn open_popup(&self) -> WebSafeResult<()> {
        self.emit(OutputLine::OpenPopup)
    }
}

/// Host with no UI; used by one-shot commands.
#[derive(Debug, Default)]
pub struct HeadlessHost;

#[async_trait]
impl ExtensionHost for HeadlessHost {
    async fn set_badge(&self, _tab_id: TabId, _badge: &BadgeState) -> WebSafeResult<()> {
        Ok(())
    }

    async fn open_popup(&self) -> WebSafeResult<()> {
        Ok(())
    }
}
