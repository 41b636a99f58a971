use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use hashshare::{project, ModelError, SimulationParameters};

use crate::{
    models::{ProjectionQ, ProjectionView},
    state::AppState,
    utils::model_status,
};

pub async fn projection(
    State(st): State<Arc<AppState>>,
    Query(q): Query<ProjectionQ>,
) -> Result<Json<ProjectionView>, (StatusCode, String)> {
    let cfg = &st.config.model;

    let params = SimulationParameters::new(
        q.gw.unwrap_or(1.0),
        q.exponent.unwrap_or(cfg.default_exponent),
        q.growth.unwrap_or(30.0) / 100.0,
    );

    let market = st.market().await;
    let price = market
        .inputs
        .price
        .ok_or(ModelError::MissingInput("price"))
        .map_err(model_status)?;

    let table = project(cfg, &params, price).map_err(model_status)?;

    Ok(Json(ProjectionView {
        price,
        updated_at: market.updated_at,
        table,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashshare::feeds::MarketData;

    fn query(gw: Option<f64>, exponent: Option<f64>, growth: Option<f64>) -> Query<ProjectionQ> {
        Query(ProjectionQ { gw, exponent, growth })
    }

    #[tokio::test]
    async fn growth_is_given_in_percent() {
        let st = AppState::with_market(AppState::live_market());
        let Json(view) = projection(State(st), query(Some(2.0), None, Some(30.0))).await.unwrap();
        assert_eq!(view.table.parameters.annual_hash_growth_rate, 0.3);
        assert_eq!(view.table.parameters.allocated_power_gw, 2.0);
        assert_eq!(view.table.parameters.price_exponent, 5.6);
        assert_eq!(view.price, 97_304.0);
        assert_eq!(view.table.rows.len(), 7);
    }

    #[tokio::test]
    async fn out_of_range_parameters_are_bad_requests() {
        let st = AppState::with_market(AppState::live_market());
        for q in [
            query(Some(0.05), None, None),
            query(None, Some(8.0), None),
            query(None, None, Some(150.0)),
        ] {
            let (status, _) = projection(State(st.clone()), q).await.unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn missing_price_is_unavailable() {
        let st = AppState::with_market(MarketData::default());
        let (status, _) = projection(State(st), query(None, None, None)).await.unwrap_err();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
