//! "As of now" opportunity cost: what a fixed share of global hash power
//! would have mined since the start height, and what it is worth today.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    config::ModelConfig,
    error::{ModelError, ModelResult},
    power_law::{days_since_origin, PowerLawModel},
};

/// Live values supplied by the data feeds. A `None` field means the feed has
/// never produced a value; the model refuses to guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
    pub block_height: Option<i64>,
    pub price: Option<f64>,
    pub hash_rate_ths: Option<f64>,
}

impl MarketInputs {
    pub fn complete(block_height: i64, price: f64, hash_rate_ths: f64) -> Self {
        Self {
            block_height: Some(block_height),
            price: Some(price),
            hash_rate_ths: Some(hash_rate_ths),
        }
    }
}

/// Fraction of global hash power attributed to the actor, in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllocationShare(f64);

impl AllocationShare {
    pub fn new(fraction: f64) -> ModelResult<Self> {
        if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
            Ok(Self(fraction))
        } else {
            Err(ModelError::InvalidShare(fraction))
        }
    }

    pub fn from_percent(percent: u32) -> ModelResult<Self> {
        Self::new(percent as f64 / 100.0)
    }

    pub fn fraction(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerMetric {
    pub network_hash_rate_ths: f64,
    pub joules_per_th: f64,
    pub total_power_watts: f64,
    pub total_power_megawatts: f64,
}

impl PowerMetric {
    pub fn from_hash_rate(network_hash_rate_ths: f64, joules_per_th: f64) -> Self {
        let total_power_watts = network_hash_rate_ths * joules_per_th;
        Self {
            network_hash_rate_ths,
            joules_per_th,
            total_power_watts,
            total_power_megawatts: total_power_watts / 1_000_000.0,
        }
    }

    pub fn allocated_megawatts(&self, share: AllocationShare) -> f64 {
        self.total_power_megawatts * share.fraction()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunitySnapshot {
    pub start_height: i64,
    pub current_height: i64,
    pub share_fraction: f64,
    pub price: f64,
    pub total_emitted_coins: f64,
    pub coins_missed: f64,
    /// Whole currency units, truncated.
    pub euro_value_missed: u64,
    /// Raw `current - start`, not clipped.
    pub blocks_missed: i64,
    pub current_block_reward: Option<f64>,
    pub power: PowerMetric,
    /// Network power scaled by the share.
    pub required_power_mw: f64,
    pub power_law: PowerLawModel,
    pub days_since_origin: i64,
}

/// Builds the snapshot from a complete set of market inputs.
pub fn snapshot(
    cfg: &ModelConfig,
    inputs: &MarketInputs,
    share: AllocationShare,
    today: NaiveDate,
) -> ModelResult<OpportunitySnapshot> {
    let current_height = inputs.block_height.ok_or(ModelError::MissingInput("block height"))?;
    let price = inputs.price.ok_or(ModelError::MissingInput("price"))?;
    let hash_rate = inputs.hash_rate_ths.ok_or(ModelError::MissingInput("network hash rate"))?;

    if !(price.is_finite() && price > 0.0) {
        return Err(ModelError::InvalidParameter {
            name: "price",
            value: price,
            reason: "must be positive",
        });
    }
    if !(hash_rate.is_finite() && hash_rate >= 0.0) {
        return Err(ModelError::InvalidParameter {
            name: "hash_rate_ths",
            value: hash_rate,
            reason: "must be non-negative",
        });
    }

    let schedule = cfg.schedule()?;
    let total_emitted_coins = schedule.emitted_coins(cfg.start_height, current_height);
    let coins_missed = total_emitted_coins * share.fraction();
    let euro_value_missed = (coins_missed * price).trunc() as u64;

    let power = PowerMetric::from_hash_rate(hash_rate, cfg.joules_per_th);

    let days = days_since_origin(cfg.origin_date, today);
    let power_law = PowerLawModel::calibrated(price, days as f64, cfg.default_exponent)?;

    Ok(OpportunitySnapshot {
        start_height: cfg.start_height,
        current_height,
        share_fraction: share.fraction(),
        price,
        total_emitted_coins,
        coins_missed,
        euro_value_missed,
        blocks_missed: current_height.saturating_sub(cfg.start_height),
        current_block_reward: schedule.reward_at(current_height),
        power,
        required_power_mw: power.allocated_megawatts(share),
        power_law,
        days_since_origin: days,
    })
}
