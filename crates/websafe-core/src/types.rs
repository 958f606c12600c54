//! Analysis data model shared by the cache, the scoring client and the router.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest displayable score.
pub const MIN_SCORE: u8 = 1;

/// Highest displayable score.
pub const MAX_SCORE: u8 = 10;

/// Score assigned to a fallback analysis.
pub const NEUTRAL_SCORE: u8 = 5;

/// Scores below this value are reported as a security concern.
pub const CONCERN_THRESHOLD: u8 = 5;

/// Host tab identifier.
pub type TabId = u32;

/// Verdict of a single indicator reported by the scoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterStatus {
    Safe,
    Warning,
    Danger,
    /// Any status the service adds later.
    #[serde(other)]
    Unknown,
}

/// One explanatory indicator behind a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Display name (e.g., "SSL Certificate").
    pub name: String,

    /// Display glyph.
    #[serde(default)]
    pub icon: String,

    /// Indicator verdict.
    pub status: ParameterStatus,

    /// Human-readable explanation.
    #[serde(default)]
    pub description: String,
}

impl Parameter {
    /// The single parameter carried by a fallback analysis.
    pub fn analysis_error() -> Self {
        Self {
            name: "Analysis Error".to_string(),
            icon: "⚠️".to_string(),
            status: ParameterStatus::Warning,
            description: "Unable to complete security analysis".to_string(),
        }
    }
}

/// Structured risk result for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Exact address that was analyzed.
    pub url: String,

    /// Risk score in `[1, 10]`, lower is more dangerous.
    pub score: u8,

    /// Indicators in service order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Local clock reading when the analysis was produced; drives cache freshness.
    pub timestamp: DateTime<Utc>,

    /// Production time reported by the scoring service. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_timestamp: Option<DateTime<Utc>>,

    /// Hostname of `url`, derived locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// True only for a synthesized fallback.
    #[serde(default)]
    pub error: bool,
}

impl Analysis {
    /// Neutral stand-in used when the scoring call fails.
    pub fn fallback(url: &str) -> Self {
        Self {
            url: url.to_string(),
            score: NEUTRAL_SCORE,
            parameters: vec![Parameter::analysis_error()],
            timestamp: Utc::now(),
            service_timestamp: None,
            domain: hostname(url),
            error: true,
        }
    }

    /// Whether the score warrants surfacing a warning.
    pub fn is_concerning(&self) -> bool {
        self.score < CONCERN_THRESHOLD
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub url: String,
}

/// Response from `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// URL as echoed by the service (possibly rewritten). Never trusted for display.
    #[serde(default)]
    pub url: Option<String>,

    /// Raw score in `[0, 100]`, higher is safer.
    pub score: f64,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Free-form verdict sentence.
    #[serde(default)]
    pub message: Option<String>,

    /// ISO-8601 production time.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Map a raw 0-100 service score onto the 1-10 display scale.
///
/// Halves round up; out-of-range input is clamped.
pub fn scale_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return NEUTRAL_SCORE;
    }
    let scaled = (raw / 10.0).round();
    scaled.clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u8
}

/// Hostname of `url`, or `None` when it has no host.
pub fn hostname(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
