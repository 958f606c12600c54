#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use websafe_core::{
    AnalysisCache, BadgeState, ExtensionHost, MemoryStore, Orchestrator, ScoringClient,
    ServiceConfig, TabId, WebSafeResult,
};
use wiremock::MockServer;

/// Host that records badge updates.
#[derive(Debug, Default)]
pub struct RecordingHost {
    badges: Mutex<Vec<(TabId, BadgeState)>>,
}

impl RecordingHost {
    pub fn badges(&self) -> Vec<(TabId, BadgeState)> {
        self.badges.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtensionHost for RecordingHost {
    async fn set_badge(&self, tab_id: TabId, badge: &BadgeState) -> WebSafeResult<()> {
        self.badges.lock().unwrap().push((tab_id, badge.clone()));
        Ok(())
    }

    async fn open_popup(&self) -> WebSafeResult<()> {
        Ok(())
    }
}

pub fn create_test_client(mock_server: &MockServer) -> ScoringClient {
    let config = ServiceConfig::default().with_url(mock_server.uri());
    ScoringClient::new(&config).expect("failed to create client")
}

pub fn create_test_orchestrator(mock_server: &MockServer) -> (Arc<Orchestrator>, Arc<RecordingHost>) {
    let host = Arc::new(RecordingHost::default());
    let orchestrator = Orchestrator::new(
        Arc::new(create_test_client(mock_server)),
        AnalysisCache::default(),
        host.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    );
    (Arc::new(orchestrator), host)
}

/// Prediction body stamped with the current time, like the live service.
pub fn predict_body(url: &str, score: f64) -> serde_json::Value {
    let now = chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string();
    predict_body_at(url, score, &now)
}

pub fn predict_body_at(url: &str, score: f64, timestamp: &str) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "score": score,
        "parameters": [
            {
                "name": "SSL Certificate",
                "icon": "🔒",
                "status": "danger",
                "description": "No SSL certificate"
            },
            {
                "name": "Subdomains",
                "icon": "🌐",
                "status": "warning",
                "description": "2 subdomains"
            }
        ],
        "message": "Warning: This website may be a phishing attempt!",
        "timestamp": timestamp
    })
}
