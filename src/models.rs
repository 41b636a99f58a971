use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hashshare::{MarketInputs, OpportunitySnapshot, PowerLawModel, ProjectionTable, SeriesPoint};

/// `/api/snapshot?share=10`
#[derive(Deserialize)]
pub struct SnapshotQ {
    pub share: Option<u32>,
}

/// `/api/projection?gw=1&exponent=5.6&growth=30` (growth in percent)
#[derive(Deserialize)]
pub struct ProjectionQ {
    pub gw: Option<f64>,
    pub exponent: Option<f64>,
    pub growth: Option<f64>,
}

#[derive(Serialize, Debug)]
pub struct SnapshotView {
    pub share_percent: u32,
    pub inputs: MarketInputs,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub snapshot: OpportunitySnapshot,
}

#[derive(Serialize, Debug)]
pub struct HistoryView {
    pub points: Vec<SeriesPoint>,
    pub power_law_curve: Vec<SeriesPoint>,
    pub power_law: PowerLawModel,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct ProjectionView {
    pub price: f64,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub table: ProjectionTable,
}
