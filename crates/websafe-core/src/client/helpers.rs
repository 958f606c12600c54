//! Pure helpers: timestamp parsing and response mapping (no HTTP, no status logic).

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use crate::error::{WebSafeError, WebSafeResult};
use crate::types::{hostname, scale_score, Analysis, PredictResponse};

/// Parse a service timestamp.
///
/// The service emits naive UTC (`2024-05-01T12:00:00.123456`); RFC 3339 with
/// an explicit offset is accepted as well.
pub(crate) fn parse_service_timestamp(raw: &str) -> WebSafeResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| WebSafeError::Parse {
            message: format!("invalid timestamp {:?}: {}", raw, e),
        })
}

/// Build an [`Analysis`] for `requested_url` from a prediction response.
///
/// The domain comes from the URL we asked about, not the one the service echoes.
/// `timestamp` is the local clock; the service's own timestamp is kept aside
/// and never affects freshness. An unreadable service timestamp is dropped.
pub(crate) fn to_analysis(
    requested_url: &str,
    response: PredictResponse,
) -> WebSafeResult<Analysis> {
    if !response.score.is_finite() {
        return Err(WebSafeError::Parse {
            message: format!("non-finite score: {}", response.score),
        });
    }

    let service_timestamp = match response.timestamp.as_deref() {
        Some(raw) => match parse_service_timestamp(raw) {
            Ok(ts) => Some(ts),
            Err(e) => {
                debug!(url = %requested_url, error = %e, "ignoring service timestamp");
                None
            }
        },
        None => None,
    };

    Ok(Analysis {
        url: requested_url.to_string(),
        score: scale_score(response.score),
        parameters: response.parameters,
        timestamp: Utc::now(),
        service_timestamp,
        domain: hostname(requested_url),
        error: false,
    })
}
