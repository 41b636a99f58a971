use anyhow::{Context, Result};
use axum::{routing::get, Router};
use dotenvy::dotenv;
use std::{sync::Arc, time::Duration};
use tokio::{
    net::TcpListener,
    time::{interval, Interval, MissedTickBehavior},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use hashshare::ServiceConfig;

mod state;
mod models;
mod utils;
mod handlers;

use state::AppState;

/// Fires immediately, then every `period`. A slow refresh pushes the next
/// tick back instead of bursting to catch up.
fn refresh_ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hashshare=debug")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let bind_addr = config.bind_addr;
    let refresh = Duration::from_secs(config.refresh_secs.max(1));

    let state = Arc::new(AppState::new(config)?);

    // market data poller; the first tick fires immediately
    let poller = state.clone();
    tokio::spawn(async move {
        let mut ticker = refresh_ticker(refresh);
        loop {
            ticker.tick().await;
            poller.refresh().await;
        }
    });

    let app = Router::new()
        .route("/health", get(handlers::pages::health))
        .route("/api/snapshot", get(handlers::snapshot::opportunity_snapshot))
        .route("/api/history", get(handlers::history::price_history))
        .route("/api/projection", get(handlers::projection::projection))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!(%bind_addr, refresh_secs = refresh.as_secs(), "listening");
    let listener = TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await.context("server crashed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_refresh_delays_next_tick() {
        let ticker = refresh_ticker(Duration::from_secs(600));
        assert_eq!(ticker.missed_tick_behavior(), MissedTickBehavior::Delay);
        assert_eq!(ticker.period(), Duration::from_secs(600));
    }
}
