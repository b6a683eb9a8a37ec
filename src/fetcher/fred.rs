use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::SeriesSource;
use crate::catalog::Catalog;
use crate::error::UpstreamError;
use crate::models::{Frequency, Observation, SeriesRequest};

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const RETRY_BASE_DELAY_MS: u64 = 250;
// Caps the doubling backoff at 250ms << 8 = 64s regardless of the attempt
// budget.
const MAX_BACKOFF_EXP: u32 = 8;

/// Connector for the FRED observations endpoint.
///
/// Validates the requested slug against the catalog before any I/O, issues
/// one read-only GET per call, and drops individual "no data" samples rather
/// than failing the request.
pub struct FredFetcher {
    client: Client,
    api_key: String,
    base_url: String,
    default_start: NaiveDate,
    max_attempts: u32,
}

impl FredFetcher {
    pub fn new(api_key: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("econ-series/0.1"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            // The consuming dashboards default their window to 2019; callers
            // override per request or per fetcher.
            default_start: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or(NaiveDate::MIN),
            max_attempts: 1,
        }
    }

    /// Reads `FRED_API_KEY` from the environment (`.env` supported).
    pub fn from_env() -> Result<Self, UpstreamError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY").map_err(|_| UpstreamError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Points the fetcher at a different observations endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Start date used when a request leaves `start` unset.
    pub fn with_default_start(mut self, start: NaiveDate) -> Self {
        self.default_start = start;
        self
    }

    /// Enables bounded retry with doubling backoff on transport and 5xx
    /// failures. The default of 1 attempt matches the source behavior.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    async fn send(
        &self,
        query: &[(&str, String)],
        frequency: Frequency,
    ) -> Result<Vec<Observation>, UpstreamError> {
        let resp = self.client.get(&self.base_url).query(query).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, message });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        parse_observations(&json, frequency)
    }
}

#[async_trait]
impl SeriesSource for FredFetcher {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch(&self, request: &SeriesRequest) -> Result<Vec<Observation>, UpstreamError> {
        // Allow-list check comes first: an unknown slug never reaches the wire.
        let meta = Catalog::get(&request.series).ok_or_else(|| UpstreamError::UnknownSeries {
            slug: request.series.clone(),
        })?;

        let frequency = request.frequency.unwrap_or(meta.frequency);
        let start = request.start.unwrap_or(self.default_start);

        let mut query: Vec<(&str, String)> = vec![
            ("series_id", meta.series_id.clone()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("frequency", frequency.as_code().to_string()),
            ("observation_start", start.to_string()),
        ];
        if let Some(end) = request.end {
            query.push(("observation_end", end.to_string()));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(&query, frequency).await {
                Ok(observations) => {
                    debug!(
                        series = %request.series,
                        frequency = frequency.as_code(),
                        count = observations.len(),
                        "fetched series"
                    );
                    return Ok(observations);
                }
                Err(err) if attempt < self.max_attempts && err.is_retryable() => {
                    warn!(series = %request.series, attempt, %err, "fetch failed, retrying");
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Turns the raw `{ observations: [{date, value}] }` payload into typed
/// observations. A pair is dropped when its value is the "." sentinel, empty,
/// null, unparseable, or non-finite; a missing observations array fails the
/// whole call.
fn parse_observations(json: &Value, frequency: Frequency) -> Result<Vec<Observation>, UpstreamError> {
    let observations = json["observations"]
        .as_array()
        .ok_or_else(|| UpstreamError::Malformed("missing observations array".to_string()))?;

    let mut out = Vec::with_capacity(observations.len());
    for obs in observations {
        let (Some(date_str), Some(raw)) = (obs["date"].as_str(), obs["value"].as_str()) else {
            continue;
        };
        let Some(value) = parse_value(raw) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
            continue;
        };
        out.push(Observation::new(date, frequency, value));
    }

    Ok(out)
}

/// Delay before retrying `attempt` (1-based): doubles per attempt, clamped
/// so oversized attempt budgets cannot overflow the shift.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(MAX_BACKOFF_EXP);
    Duration::from_millis(RETRY_BASE_DELAY_MS << exp)
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_valid_response() {
        let body = json!({
            "observations": [
                { "date": "2023-01-01", "value": "3.4" },
                { "date": "2023-02-01", "value": "3.6" }
            ]
        });

        let obs = parse_observations(&body, Frequency::Monthly).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].value, 3.4);
        assert_eq!(obs[0].period_label, "2023-01");
        assert_eq!(obs[1].date, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn sentinels_are_dropped_not_padded() {
        let body = json!({
            "observations": [
                { "date": "2023-01-01", "value": "." },
                { "date": "2023-02-01", "value": "" },
                { "date": "2023-03-01", "value": null },
                { "date": "2023-04-01", "value": "not-a-number" },
                { "date": "2023-05-01", "value": "NaN" },
                { "date": "2023-06-01", "value": "100.0" }
            ]
        });

        let obs = parse_observations(&body, Frequency::Monthly).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].value, 100.0);
        assert_eq!(obs[0].period_label, "2023-06");
    }

    #[test]
    fn bad_dates_are_dropped() {
        let body = json!({
            "observations": [
                { "date": "01/02/2023", "value": "1.0" },
                { "date": "2023-03-01", "value": "2.0" }
            ]
        });

        let obs = parse_observations(&body, Frequency::Monthly).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].value, 2.0);
    }

    #[test]
    fn missing_observations_array_is_malformed() {
        let body = json!({ "error_message": "Bad Request" });
        let err = parse_observations(&body, Frequency::Monthly).unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }

    #[test]
    fn backoff_doubles_then_clamps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(250));
        assert_eq!(backoff_delay(2), Duration::from_millis(500));
        assert_eq!(backoff_delay(3), Duration::from_millis(1000));
        // Absurd attempt budgets must not overflow the shift.
        assert_eq!(backoff_delay(100), Duration::from_millis(64_000));
        assert_eq!(backoff_delay(u32::MAX), backoff_delay(100));
    }

    #[test]
    fn parse_value_filters_sentinels() {
        assert_eq!(parse_value("4.25"), Some(4.25));
        assert_eq!(parse_value("  4.25 "), Some(4.25));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("inf"), None);
        assert_eq!(parse_value("abc"), None);
    }
}
