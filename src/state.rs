// state.rs
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::sync::RwLock;

use hashshare::{config::ServiceConfig, feeds::MarketData};

pub struct AppState {
    pub http: Client,
    pub config: ServiceConfig,
    /// Replaced wholesale on each refresh; readers clone it.
    pub market: RwLock<MarketData>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("hashshare/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            config,
            market: RwLock::new(MarketData::default()),
        })
    }

    pub async fn market(&self) -> MarketData {
        self.market.read().await.clone()
    }

    pub async fn refresh(&self) {
        let current = self.market().await;
        let next = current.refreshed(&self.http, &self.config.feeds).await;
        *self.market.write().await = next;
    }
}

#[cfg(test)]
impl AppState {
    /// State with default model constants and the given market data.
    pub fn with_market(market: MarketData) -> std::sync::Arc<Self> {
        let config = ServiceConfig {
            bind_addr: std::net::SocketAddr::from(([127, 0, 0, 1], 0)),
            feeds: hashshare::FeedEndpoints::default(),
            refresh_secs: 600,
            model: hashshare::ModelConfig::default(),
        };
        let st = Self {
            http: Client::new(),
            config,
            market: RwLock::new(market),
        };
        std::sync::Arc::new(st)
    }

    pub fn live_market() -> MarketData {
        MarketData {
            inputs: hashshare::MarketInputs::complete(916_944, 97_304.0, 6.0e8),
            history: Vec::new(),
            updated_at: None,
        }
    }
}
