//! In-memory analysis cache keyed by exact URL.
//!
//! Lookups never judge freshness; callers pair [`AnalysisCache::get`] with
//! [`AnalysisCache::is_fresh`]. Stale entries stay in place until a
//! recomputation overwrites them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;

use crate::types::Analysis;

/// Default freshness window (30 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// URL -> most recent analysis.
#[derive(Clone)]
pub struct AnalysisCache {
    entries: Cache<String, Analysis>,
    ttl: Duration,
}

impl std::fmt::Debug for AnalysisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        // No capacity and no expiry policy: entries live for the whole session.
        Self {
            entries: Cache::builder().build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up the last analysis stored for `url`, fresh or not.
    pub fn get(&self, url: &str) -> Option<Analysis> {
        self.entries.get(url)
    }

    /// Store `analysis` under `url`, replacing any previous entry.
    pub fn put(&self, url: &str, analysis: Analysis) {
        self.entries.insert(url.to_string(), analysis);
    }

    /// Whether `analysis` is younger than the TTL.
    pub fn is_fresh(&self, analysis: &Analysis) -> bool {
        self.is_fresh_at(analysis, Utc::now())
    }

    /// Freshness relative to an explicit clock reading.
    pub fn is_fresh_at(&self, analysis: &Analysis, now: DateTime<Utc>) -> bool {
        let Ok(ttl) = chrono::Duration::from_std(self.ttl) else {
            return true;
        };
        now.signed_duration_since(analysis.timestamp) < ttl
    }

    /// Fresh entry for `url`, if any.
    pub fn get_fresh(&self, url: &str) -> Option<Analysis> {
        self.get(url).filter(|analysis| self.is_fresh(analysis))
    }

    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Parameter, ParameterStatus};

    fn analysis_at(url: &str, timestamp: DateTime<Utc>) -> Analysis {
        Analysis {
            url: url.to_string(),
            score: 8,
            parameters: vec![Parameter {
                name: "SSL Certificate".to_string(),
                icon: "🔒".to_string(),
                status: ParameterStatus::Safe,
                description: "Valid SSL certificate".to_string(),
            }],
            timestamp,
            service_timestamp: None,
            domain: Some("example.com".to_string()),
            error: false,
        }
    }

    #[test]
    fn test_cache_roundtrip() {
        let cache = AnalysisCache::default();
        let analysis = analysis_at("https://example.com", Utc::now());

        cache.put("https://example.com", analysis.clone());

        assert_eq!(cache.get("https://example.com"), Some(analysis));
    }

    #[test]
    fn test_cache_miss() {
        let cache = AnalysisCache::default();
        assert!(cache.get("https://nowhere.example").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_not_normalized() {
        let cache = AnalysisCache::default();
        cache.put(
            "https://example.com/?a=1",
            analysis_at("https://example.com/?a=1", Utc::now()),
        );

        assert!(cache.get("https://example.com/?a=1").is_some());
        assert!(cache.get("https://example.com/?a=2").is_none());
        assert!(cache.get("https://example.com/?a=1#top").is_none());
    }

    #[test]
    fn test_ttl_boundary() {
        let cache = AnalysisCache::default();
        let t0 = Utc::now();
        let analysis = analysis_at("https://example.com", t0);

        assert!(cache.is_fresh_at(&analysis, t0 + chrono::Duration::seconds(1799)));
        assert!(!cache.is_fresh_at(&analysis, t0 + chrono::Duration::seconds(1800)));
        assert!(!cache.is_fresh_at(&analysis, t0 + chrono::Duration::seconds(1801)));
    }

    #[test]
    fn test_stale_entry_is_still_returned_by_get() {
        let cache = AnalysisCache::default();
        let old = Utc::now() - chrono::Duration::hours(2);
        cache.put("https://example.com", analysis_at("https://example.com", old));

        let entry = cache.get("https://example.com").unwrap();
        assert!(!cache.is_fresh(&entry));
        assert!(cache.get_fresh("https://example.com").is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = AnalysisCache::default();
        let mut first = analysis_at("https://example.com", Utc::now());
        first.score = 2;
        let second = analysis_at("https://example.com", Utc::now());

        cache.put("https://example.com", first);
        cache.put("https://example.com", second.clone());

        assert_eq!(cache.get("https://example.com"), Some(second));
        assert_eq!(cache.len(), 1);
    }
}
