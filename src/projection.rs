//! Forward simulation: a fixed hardware deployment mining against a
//! growing network over the projection years, priced on the power-law curve.

use serde::{Deserialize, Serialize};

use crate::{
    config::ModelConfig,
    error::{ModelError, ModelResult},
    power_law::{days_to_midyear, PowerLawModel},
};

/// Inputs of one projection run. Built fresh for every recompute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub allocated_power_gw: f64,
    pub price_exponent: f64,
    /// Fractional annual growth of global hash rate (0.30 = 30 %/yr).
    pub annual_hash_growth_rate: f64,
}

impl SimulationParameters {
    pub fn new(allocated_power_gw: f64, price_exponent: f64, annual_hash_growth_rate: f64) -> Self {
        Self { allocated_power_gw, price_exponent, annual_hash_growth_rate }
    }

    pub fn validate(&self, cfg: &ModelConfig) -> ModelResult<()> {
        let gw = self.allocated_power_gw;
        if !(gw.is_finite() && gw >= cfg.min_allocated_power_gw) {
            return Err(ModelError::InvalidParameter {
                name: "allocated_power_gw",
                value: gw,
                reason: "below the minimum deployment",
            });
        }
        let e = self.price_exponent;
        if !(e >= cfg.min_exponent && e <= cfg.max_exponent) {
            return Err(ModelError::InvalidParameter {
                name: "price_exponent",
                value: e,
                reason: "outside the supported exponent range",
            });
        }
        let g = self.annual_hash_growth_rate;
        if !(g >= 0.0 && g <= cfg.max_growth_rate) {
            return Err(ModelError::InvalidParameter {
                name: "annual_hash_growth_rate",
                value: g,
                reason: "outside the supported growth range",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyProjectionRow {
    pub year: i32,
    pub days_since_origin: i64,
    pub projected_price: f64,
    pub global_hash_eh: f64,
    pub allocation_hash_share_pct: f64,
    pub average_reward_per_block: f64,
    pub annual_network_emission: f64,
    pub coins_captured: f64,
    pub revenue: f64,
    pub cumulative_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionTable {
    pub parameters: SimulationParameters,
    pub allocated_hash_eh: f64,
    pub power_law: PowerLawModel,
    pub rows: Vec<YearlyProjectionRow>,
    pub total_coins_captured: f64,
    pub total_revenue: f64,
}

/// Subsidy plus fees averaged over `year`. Before the halving year the full
/// reward applies; the halving year itself is day-weighted; the years up to
/// the next halving get half; from `halving_year + halving_interval_years`
/// onward a quarter.
pub fn average_reward_per_block(cfg: &ModelConfig, year: i32) -> f64 {
    let full = cfg.projection_block_reward;
    let half = full / 2.0;
    let subsidy = if year < cfg.halving_year {
        full
    } else if year == cfg.halving_year {
        let before = cfg.pre_halving_days / cfg.days_per_year;
        full * before + half * (1.0 - before)
    } else if year < cfg.halving_year + cfg.halving_interval_years {
        half
    } else {
        full / 4.0
    };
    subsidy + cfg.fee_per_block
}

/// Runs the whole projection. Either every row is produced or an error is.
pub fn project(
    cfg: &ModelConfig,
    params: &SimulationParameters,
    current_price: f64,
) -> ModelResult<ProjectionTable> {
    params.validate(cfg)?;

    let reference_days = days_to_midyear(cfg.origin_date, cfg.reference_year)?;
    let power_law =
        PowerLawModel::calibrated(current_price, reference_days as f64, params.price_exponent)?;

    let allocated_hash_eh = params.allocated_power_gw * cfg.hash_per_gw_eh;
    let growth = 1.0 + params.annual_hash_growth_rate;

    let mut rows = Vec::new();
    let mut cumulative = 0.0;
    for year in cfg.projection_years() {
        let days = days_to_midyear(cfg.origin_date, year)?;
        let projected_price = power_law.price_at(days as f64)?;

        let years_out = year - cfg.projection_first_year;
        let global_hash_eh = cfg.base_global_hash_eh * growth.powi(years_out);
        let allocation_hash_share_pct = allocated_hash_eh / global_hash_eh * 100.0;

        let average_reward = average_reward_per_block(cfg, year);
        let annual_network_emission = average_reward * cfg.blocks_per_day * cfg.days_per_year;
        let coins_captured = allocation_hash_share_pct / 100.0 * annual_network_emission;
        let revenue = coins_captured * projected_price;
        cumulative += revenue;

        rows.push(YearlyProjectionRow {
            year,
            days_since_origin: days,
            projected_price,
            global_hash_eh,
            allocation_hash_share_pct,
            average_reward_per_block: average_reward,
            annual_network_emission,
            coins_captured,
            revenue,
            cumulative_revenue: cumulative,
        });
    }

    Ok(ProjectionTable {
        parameters: *params,
        allocated_hash_eh,
        power_law,
        total_coins_captured: rows.iter().map(|r| r.coins_captured).sum(),
        total_revenue: cumulative,
        rows,
    })
}
