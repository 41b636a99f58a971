use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use hashshare::{snapshot, AllocationShare};

use crate::{
    models::{SnapshotQ, SnapshotView},
    state::AppState,
    utils::{bad_request, model_status},
};

pub async fn opportunity_snapshot(
    State(st): State<Arc<AppState>>,
    Query(q): Query<SnapshotQ>,
) -> Result<Json<SnapshotView>, (StatusCode, String)> {
    let cfg = &st.config.model;

    // only the published share options are offered
    let share_percent = q.share.unwrap_or(cfg.default_share_percent);
    if !cfg.allowed_share_percents.contains(&share_percent) {
        return Err(bad_request(format!(
            "share must be one of {:?} (percent)",
            cfg.allowed_share_percents
        )));
    }
    let share = AllocationShare::from_percent(share_percent).map_err(model_status)?;

    let market = st.market().await;
    let today = Utc::now().date_naive();
    let snapshot = snapshot(cfg, &market.inputs, share, today).map_err(model_status)?;

    Ok(Json(SnapshotView {
        share_percent,
        inputs: market.inputs,
        updated_at: market.updated_at,
        snapshot,
    }))
}
