//! Test doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::badge::BadgeState;
use crate::client::Scorer;
use crate::error::{WebSafeError, WebSafeResult};
use crate::host::ExtensionHost;
use crate::types::{hostname, Analysis, TabId};

/// Scorer with a canned answer and a call log.
#[derive(Debug, Default)]
pub(crate) struct FakeScorer {
    score: Option<u8>,
    gate: Option<Notify>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl FakeScorer {
    pub(crate) fn returning(score: u8) -> Self {
        Self {
            score: Some(score),
            ..Default::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self::default()
    }

    /// Block every call until [`FakeScorer::release`].
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scorer for FakeScorer {
    async fn score(&self, url: &str) -> WebSafeResult<Analysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match self.score {
            Some(score) => Ok(Analysis {
                url: url.to_string(),
                score,
                parameters: Vec::new(),
                timestamp: Utc::now(),
                service_timestamp: None,
                domain: hostname(url),
                error: false,
            }),
            None => Err(WebSafeError::Service {
                status: 500,
                message: "internal server error".to_string(),
            }),
        }
    }
}

/// Host that records every badge and popup request.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    badges: Mutex<Vec<(TabId, BadgeState)>>,
    popups: AtomicUsize,
}

impl RecordingHost {
    pub(crate) fn badges(&self) -> Vec<(TabId, BadgeState)> {
        self.badges.lock().unwrap().clone()
    }

    pub(crate) fn popups(&self) -> usize {
        self.popups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtensionHost for RecordingHost {
    async fn set_badge(&self, tab_id: TabId, badge: &BadgeState) -> WebSafeResult<()> {
        self.badges.lock().unwrap().push((tab_id, badge.clone()));
        Ok(())
    }

    async fn open_popup(&self) -> WebSafeResult<()> {
        self.popups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Collects formatted log output for the current thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Capture `WARN` and above until the guard is dropped.
    pub(crate) fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        (capture, tracing::subscriber::set_default(subscriber))
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
