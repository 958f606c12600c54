//! Tab scan orchestration: get-or-compute, badge updates, per-tab state.
//!
//! ```text
//! navigation ──► skip? ──► cache (fresh?) ──► single-flight ──► Scorer
//!                                 │                   │
//!                                 ▼                   ▼
//!                              Analysis ◄──── put on success / fallback on error
//!                                 │
//!                                 ▼
//!                        badge + tab_{id} state
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::badge::BadgeState;
use crate::cache::AnalysisCache;
use crate::client::Scorer;
use crate::error::{WebSafeError, WebSafeResult};
use crate::host::{tab_key, ExtensionHost, KeyValueStore};
use crate::settings::Settings;
use crate::single_flight::SingleFlight;
use crate::types::{Analysis, TabId};

/// Address prefixes that are never sent to the scoring service.
pub const SKIP_PREFIXES: [&str; 6] = [
    "chrome://",
    "chrome-extension://",
    "moz-extension://",
    "about:",
    "file://",
    "data:",
];

/// Tab status that triggers a scan.
pub const STATUS_COMPLETE: &str = "complete";

/// Non-web and extension-internal addresses.
pub fn should_skip_url(url: &str) -> bool {
    SKIP_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

/// Clean up a URL typed or pasted by the user.
///
/// Adds `http://` when no scheme is present and only accepts http(s) with a host.
pub fn normalize_manual_url(raw: &str) -> WebSafeResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WebSafeError::InvalidUrl {
            url: raw.to_string(),
            reason: "please enter a URL".to_string(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let parsed = url::Url::parse(&candidate).map_err(|e| WebSafeError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(WebSafeError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme: {}", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(WebSafeError::InvalidUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(candidate)
}

/// Coordinates cache, scorer and host for every analyze entry point.
pub struct Orchestrator {
    scorer: Arc<dyn Scorer>,
    cache: AnalysisCache,
    flights: SingleFlight<Analysis>,
    host: Arc<dyn ExtensionHost>,
    /// Per-tab state.
    local: Arc<dyn KeyValueStore>,
    /// Settings.
    synced: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("cache", &self.cache)
            .field("flights", &self.flights)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        scorer: Arc<dyn Scorer>,
        cache: AnalysisCache,
        host: Arc<dyn ExtensionHost>,
        local: Arc<dyn KeyValueStore>,
        synced: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            scorer,
            cache,
            flights: SingleFlight::new(),
            host,
            local,
            synced,
        }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn host(&self) -> &Arc<dyn ExtensionHost> {
        &self.host
    }

    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }

    /// Cached analysis if fresh, otherwise one (shared) scoring call.
    ///
    /// Scoring failures never surface here: they become a fallback analysis,
    /// which is returned but not cached. Only [`WebSafeError::SkippedUrl`] is
    /// returned as an error.
    pub async fn get_or_compute(&self, url: &str) -> WebSafeResult<Analysis> {
        if should_skip_url(url) {
            return Err(WebSafeError::SkippedUrl {
                url: url.to_string(),
            });
        }

        if let Some(cached) = self.cache.get(url) {
            if self.cache.is_fresh(&cached) {
                debug!(url = %url, score = cached.score, "cache hit");
                return Ok(cached);
            }
            debug!(url = %url, "cache entry stale");
        } else {
            debug!(url = %url, "cache miss");
        }

        let scorer = Arc::clone(&self.scorer);
        let cache = self.cache.clone();
        let owned_url = url.to_string();
        let flight = self
            .flights
            .run(url, move || score_and_cache(scorer, cache, owned_url))
            .await;

        if flight.joined {
            debug!(url = %url, "joined in-flight analysis");
        }

        Ok(flight.value.unwrap_or_else(|| {
            warn!(url = %url, "analysis task aborted, using fallback analysis");
            Analysis::fallback(url)
        }))
    }

    /// `analyzeUrl` from a content script or popup. `None` for skipped URLs.
    pub async fn handle_explicit_analyze(&self, url: &str) -> Option<Analysis> {
        match self.get_or_compute(url).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                debug!(url = %url, reason = %e, "not analyzed");
                None
            }
        }
    }

    /// Raw tab-updated notification; only completed loads with a URL scan.
    pub async fn handle_tab_updated(
        &self,
        tab_id: TabId,
        url: Option<&str>,
        status: Option<&str>,
    ) -> WebSafeResult<Option<Analysis>> {
        match (url, status) {
            (Some(url), Some(STATUS_COMPLETE)) if !url.is_empty() => {
                self.handle_navigation_complete(tab_id, url).await
            }
            _ => Ok(None),
        }
    }

    /// Scan a tab's freshly loaded page, update its badge and remember the result.
    pub async fn handle_navigation_complete(
        &self,
        tab_id: TabId,
        url: &str,
    ) -> WebSafeResult<Option<Analysis>> {
        if should_skip_url(url) {
            debug!(tab_id, url = %url, "skipping non-web url");
            return Ok(None);
        }

        let settings = Settings::load(self.synced.as_ref()).await?;
        if !settings.auto_scan {
            debug!(tab_id, "auto scan disabled");
            return Ok(None);
        }

        let analysis = match self.get_or_compute(url).await {
            Ok(analysis) => analysis,
            Err(WebSafeError::SkippedUrl { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let badge = BadgeState::for_score(analysis.score);
        self.host.set_badge(tab_id, &badge).await?;

        let state = serde_json::to_value(&analysis).map_err(|e| WebSafeError::Storage {
            message: format!("failed to encode tab state: {}", e),
        })?;
        self.local.set(&tab_key(tab_id), state).await?;

        info!(tab_id, url = %url, score = analysis.score, tier = ?badge.tier, "tab scanned");
        Ok(Some(analysis))
    }

    /// `quickAnalyze`: run the pipeline in the background and return immediately.
    ///
    /// The handle may be dropped; the analysis still completes.
    pub fn handle_quick_analyze(self: &Arc<Self>, url: &str) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        let url = url.to_string();
        tokio::spawn(async move {
            if let Ok(analysis) = this.get_or_compute(&url).await {
                if analysis.is_concerning() {
                    warn!(url = %url, score = analysis.score, "quick analysis found security concerns");
                }
            }
        })
    }

    /// Popup "analyze" button: validated input, no fallback.
    ///
    /// Errors are returned so the UI can show them; a success is cached like
    /// any other analysis.
    pub async fn handle_manual_analyze(&self, raw: &str) -> WebSafeResult<Analysis> {
        let url = normalize_manual_url(raw)?;
        let analysis = self.scorer.score(&url).await?;
        self.cache.put(&url, analysis.clone());
        Ok(analysis)
    }

    /// Last analysis recorded for a tab.
    pub async fn tab_analysis(&self, tab_id: TabId) -> WebSafeResult<Option<Analysis>> {
        let Some(value) = self.local.get(&tab_key(tab_id)).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| WebSafeError::Storage {
                message: format!("corrupt tab state for tab {}: {}", tab_id, e),
            })
    }
}

/// Leader side of a flight.
///
/// Re-checks the cache first: a flight for the same URL may have landed
/// between the caller's freshness check and the flight table lookup.
async fn score_and_cache(scorer: Arc<dyn Scorer>, cache: AnalysisCache, url: String) -> Analysis {
    if let Some(fresh) = cache.get_fresh(&url) {
        debug!(url = %url, "fresh entry landed before scoring");
        return fresh;
    }

    match scorer.score(&url).await {
        Ok(analysis) => {
            cache.put(&url, analysis.clone());
            analysis
        }
        Err(e) => {
            warn!(url = %url, error = %e, "scoring failed, using fallback analysis");
            Analysis::fallback(&url)
        }
    }
}
