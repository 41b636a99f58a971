//! Remote market data: tip height, EUR price, network hash rate and the
//! historical price series. Retries and fallbacks live here, never in the model.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{config::FeedEndpoints, history::PricePoint, snapshot::MarketInputs};

const MAX_ATTEMPTS: u32 = 4;
const MAX_DELAY_MS: u64 = 8_000;
/// 2018-01-01T00:00:00Z, start of the historical series.
pub const HISTORY_FROM_UNIX: i64 = 1_514_764_800;

#[derive(Deserialize)]
struct SimplePrice {
    bitcoin: EurQuote,
}

#[derive(Deserialize)]
struct EurQuote {
    eur: f64,
}

#[derive(Deserialize)]
struct HashRateChart {
    values: Vec<ChartValue>,
}

#[derive(Deserialize)]
struct ChartValue {
    y: f64,
}

#[derive(Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

fn retryable(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// GET with bounded exponential backoff; returns the body text.
async fn get_text(http: &Client, url: &str) -> anyhow::Result<String> {
    let mut delay_ms = 500u64;

    for attempt in 1..=MAX_ATTEMPTS {
        match http.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                return resp.text().await.with_context(|| format!("reading body of {url}"));
            }
            Ok(resp) => {
                let status = resp.status();
                if retryable(status) && attempt < MAX_ATTEMPTS {
                    warn!(%url, %status, attempt, delay_ms, "feed error, retrying");
                    sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
                    continue;
                }
                anyhow::bail!("{url} returned {status}");
            }
            Err(e) => {
                if (e.is_timeout() || e.is_connect()) && attempt < MAX_ATTEMPTS {
                    warn!(%url, error = %e, attempt, delay_ms, "network error, retrying");
                    sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = (delay_ms * 2).min(MAX_DELAY_MS);
                    continue;
                }
                return Err(anyhow::anyhow!("request to {url} failed: {e}"));
            }
        }
    }

    anyhow::bail!("exhausted retries calling {url}");
}

pub fn parse_height(body: &str) -> anyhow::Result<i64> {
    body.trim().parse().context("tip height is not an integer")
}

pub fn parse_price(body: &str) -> anyhow::Result<f64> {
    let p: SimplePrice = serde_json::from_str(body).context("parsing simple price")?;
    Ok(p.bitcoin.eur)
}

pub fn parse_hash_rate(body: &str) -> anyhow::Result<f64> {
    let chart: HashRateChart = serde_json::from_str(body).context("parsing hash-rate chart")?;
    chart
        .values
        .last()
        .map(|v| v.y)
        .ok_or_else(|| anyhow::anyhow!("hash-rate chart has no values"))
}

pub fn parse_history(body: &str) -> anyhow::Result<Vec<PricePoint>> {
    let chart: MarketChart = serde_json::from_str(body).context("parsing market chart")?;
    Ok(chart
        .prices
        .into_iter()
        .map(|(ts, price)| PricePoint { timestamp_ms: ts as i64, price })
        .collect())
}

pub async fn fetch_block_height(http: &Client, ep: &FeedEndpoints) -> anyhow::Result<i64> {
    let url = format!("{}/blocks/tip/height", ep.blockstream);
    parse_height(&get_text(http, &url).await?)
}

pub async fn fetch_price(http: &Client, ep: &FeedEndpoints) -> anyhow::Result<f64> {
    let url = format!("{}/simple/price?ids=bitcoin&vs_currencies=eur", ep.coingecko);
    parse_price(&get_text(http, &url).await?)
}

pub async fn fetch_hash_rate_ths(http: &Client, ep: &FeedEndpoints) -> anyhow::Result<f64> {
    let url = format!("{}/charts/hash-rate?format=json", ep.blockchain_info);
    parse_hash_rate(&get_text(http, &url).await?)
}

pub async fn fetch_price_history(
    http: &Client,
    ep: &FeedEndpoints,
    to: DateTime<Utc>,
) -> anyhow::Result<Vec<PricePoint>> {
    let url = format!(
        "{}/coins/bitcoin/market_chart/range?vs_currency=eur&from={}&to={}",
        ep.coingecko,
        HISTORY_FROM_UNIX,
        to.timestamp()
    );
    parse_history(&get_text(http, &url).await?)
}

/// Latest known values from every feed, plus when they were last refreshed.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub inputs: MarketInputs,
    pub history: Vec<PricePoint>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MarketData {
    /// Fetches every feed and merges the results over `self`.
    pub async fn refreshed(&self, http: &Client, ep: &FeedEndpoints) -> MarketData {
        let now = Utc::now();
        let (height, price, hash_rate, history) = tokio::join!(
            fetch_block_height(http, ep),
            fetch_price(http, ep),
            fetch_hash_rate_ths(http, ep),
            fetch_price_history(http, ep, now),
        );
        self.merged(height, price, hash_rate, history, now)
    }

    /// A failed feed keeps its last-known-good value; a never-fetched one
    /// stays missing. `updated_at` moves only when at least one feed succeeded.
    pub fn merged(
        &self,
        height: anyhow::Result<i64>,
        price: anyhow::Result<f64>,
        hash_rate: anyhow::Result<f64>,
        history: anyhow::Result<Vec<PricePoint>>,
        now: DateTime<Utc>,
    ) -> MarketData {
        let mut next = self.clone();
        let mut any_ok = false;

        match height {
            Ok(h) => {
                next.inputs.block_height = Some(h);
                any_ok = true;
            }
            Err(e) => warn!("block height feed failed: {e:#}"),
        }
        match price {
            Ok(p) => {
                next.inputs.price = Some(p);
                any_ok = true;
            }
            Err(e) => warn!("price feed failed: {e:#}"),
        }
        match hash_rate {
            Ok(r) => {
                next.inputs.hash_rate_ths = Some(r);
                any_ok = true;
            }
            Err(e) => warn!("hash-rate feed failed: {e:#}"),
        }
        match history {
            Ok(h) => {
                next.history = h;
                any_ok = true;
            }
            Err(e) => warn!("price history feed failed: {e:#}"),
        }

        if any_ok {
            next.updated_at = Some(now);
        }
        debug!(inputs = ?next.inputs, history_len = next.history.len(), "market data merged");
        next
    }
}
