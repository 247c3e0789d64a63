use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use portfolio_core::{PortfolioError, PriceDataProvider, RawMonthlySeries, RawRow};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let Some(&oldest) = ts.front() else { continue };
            let sleep_dur = (oldest + self.window).duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for Alpha Vantage slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Client for the Alpha Vantage monthly-adjusted time series endpoint
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        // Free tier allows 5 requests/minute; paid keys can raise this via
        // ALPHAVANTAGE_RATE_LIMIT.
        let rate_limit: usize = std::env::var("ALPHAVANTAGE_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Fetch the full monthly-adjusted history for a symbol. Alpha Vantage
    /// signals throttling inside a 200 body ("Note"), so those responses are
    /// retried with a wait instead of surfacing immediately.
    pub async fn monthly_adjusted(&self, symbol: &str) -> Result<RawMonthlySeries, PortfolioError> {
        let url = format!(
            "{}?function=TIME_SERIES_MONTHLY_ADJUSTED&symbol={}&apikey={}",
            BASE_URL, symbol, self.api_key
        );

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| fetch_error(symbol, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(fetch_error(symbol, format!("HTTP {status}: {body}")));
            }

            let json: Value = response
                .json()
                .await
                .map_err(|e| fetch_error(symbol, format!("invalid JSON body: {e}")))?;

            if let Some(note) = json.get("Note") {
                let wait_secs = 15u64;
                tracing::warn!(
                    "Alpha Vantage throttled {}, waiting {}s before retry {}/3: {}",
                    symbol,
                    wait_secs,
                    attempt + 1,
                    note
                );
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                continue;
            }

            return parse_monthly_payload(symbol, &json);
        }

        Err(fetch_error(symbol, "rate limited after 3 attempts".to_string()))
    }
}

#[async_trait]
impl PriceDataProvider for AlphaVantageClient {
    async fn monthly_adjusted(&self, symbol: &str) -> Result<RawMonthlySeries, PortfolioError> {
        AlphaVantageClient::monthly_adjusted(self, symbol).await
    }
}

fn fetch_error(symbol: &str, reason: String) -> PortfolioError {
    PortfolioError::Fetch {
        symbol: symbol.to_string(),
        reason,
    }
}

/// Classify an Alpha Vantage payload and pull the raw monthly rows out of it.
/// Field names keep their numeric prefixes; cleaning them is the engine's job.
fn parse_monthly_payload(symbol: &str, json: &Value) -> Result<RawMonthlySeries, PortfolioError> {
    if let Some(error) = json.get("Error Message") {
        return Err(fetch_error(symbol, format!("Alpha Vantage error: {error}")));
    }
    // "Information" carries daily-quota and premium-endpoint notices; waiting
    // does not clear those
    if let Some(info) = json.get("Information") {
        return Err(fetch_error(symbol, format!("Alpha Vantage notice: {info}")));
    }

    let series = json
        .get("Monthly Adjusted Time Series")
        .and_then(Value::as_object)
        .ok_or_else(|| fetch_error(symbol, "no monthly time series in response".to_string()))?;

    let mut rows = Vec::with_capacity(series.len());
    for (date_str, values) in series {
        let date = date_str
            .parse::<NaiveDate>()
            .map_err(|_| fetch_error(symbol, format!("malformed date key {date_str:?}")))?;
        let fields = values
            .as_object()
            .ok_or_else(|| fetch_error(symbol, format!("malformed row on {date_str}")))?
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect();
        rows.push(RawRow { date, fields });
    }

    Ok(RawMonthlySeries {
        symbol: symbol.to_string(),
        rows,
    })
}
