//! Background analysis core for the WebSafe phishing checker.
//!
//! Sits between the browser host and a remote scoring service:
//!
//! - Scoring client for `POST /predict` (single attempt, no retry)
//! - URL-keyed analysis cache with a lazy TTL check
//! - Tab scan orchestration with per-URL request coalescing
//! - Message routing for content scripts and the popup
//! - Badge tier derivation from scores
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use websafe_core::{BackgroundService, MemoryStore, Request, ServiceConfig};
//! # use websafe_core::{BadgeState, ExtensionHost, TabId, WebSafeResult};
//! # struct Host;
//! # #[async_trait::async_trait]
//! # impl ExtensionHost for Host {
//! #     async fn set_badge(&self, _: TabId, _: &BadgeState) -> WebSafeResult<()> { Ok(()) }
//! #     async fn open_popup(&self) -> WebSafeResult<()> { Ok(()) }
//! # }
//!
//! # async fn example() -> websafe_core::WebSafeResult<()> {
//! let service = BackgroundService::start(
//!     &ServiceConfig::from_env(),
//!     Arc::new(Host),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryStore::new()),
//! )
//! .await?;
//!
//! let reply = service
//!     .router()
//!     .handle(Request::AnalyzeUrl { url: "https://example.com".into() })
//!     .await;
//! println!("{:?}", reply);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `WEBSAFE_SERVICE_URL` | Scoring service base URL (default: `http://localhost:5000`) |
//! | `WEBSAFE_SERVICE_TIMEOUT` | Request timeout in seconds (default: transport default) |
//! | `WEBSAFE_CACHE_TTL` | Cache freshness window in seconds (default: 1800) |

pub mod badge;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod orchestrator;
pub mod router;
pub mod service;
pub mod settings;
pub mod single_flight;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use badge::{BadgeState, BadgeTier};
pub use cache::{AnalysisCache, DEFAULT_TTL};
pub use client::{Scorer, ScoringClient, WEBSAFE_USER_AGENT};
pub use config::ServiceConfig;
pub use error::{WebSafeError, WebSafeResult};
pub use host::{tab_key, ExtensionHost, KeyValueStore, MemoryStore};
pub use orchestrator::{normalize_manual_url, should_skip_url, Orchestrator, SKIP_PREFIXES};
pub use router::{Request, Response, Router};
pub use service::{BackgroundService, HostEvent};
pub use settings::{Settings, Theme};
pub use single_flight::{Flight, SingleFlight};
pub use types::{
    hostname, scale_score, Analysis, HealthStatus, Parameter, ParameterStatus, PredictRequest,
    PredictResponse, TabId,
};
