use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use hashshare::{
    history::sample,
    power_law::{days_since_origin, PowerLawModel},
    ModelError,
};

use crate::{models::HistoryView, state::AppState, utils::model_status};

/// Weekly price history with the power-law curve projected forward from today.
pub async fn price_history(
    State(st): State<Arc<AppState>>,
) -> Result<Json<HistoryView>, (StatusCode, String)> {
    let cfg = &st.config.model;
    let market = st.market().await;

    let price = market
        .inputs
        .price
        .ok_or(ModelError::MissingInput("price"))
        .map_err(model_status)?;
    let today = days_since_origin(cfg.origin_date, Utc::now().date_naive());

    let power_law =
        PowerLawModel::calibrated(price, today as f64, cfg.default_exponent).map_err(model_status)?;
    let power_law_curve = power_law
        .curve(today, cfg.curve_horizon_days, cfg.curve_step_days, cfg.days_per_year)
        .map_err(model_status)?;

    Ok(Json(HistoryView {
        points: sample(&market.history, cfg.history_stride, cfg.days_per_year),
        power_law_curve,
        power_law,
        updated_at: market.updated_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashshare::{feeds::MarketData, PricePoint};

    #[tokio::test]
    async fn samples_history_and_adds_curve() {
        let mut market = AppState::live_market();
        market.history = (0..21)
            .map(|i| PricePoint { timestamp_ms: 1_514_764_800_000 + i * 86_400_000, price: 1.0 })
            .collect();
        let st = AppState::with_market(market);
        let Json(view) = price_history(State(st)).await.unwrap();
        assert_eq!(view.points.len(), 3);
        assert_eq!(view.power_law_curve.len(), 5 * 365 / 30 + 1);
        assert_eq!(view.power_law.exponent(), 5.6);
    }

    #[tokio::test]
    async fn missing_price_is_unavailable() {
        let st = AppState::with_market(MarketData::default());
        let (status, _) = price_history(State(st)).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
