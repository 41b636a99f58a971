use std::{fs, net::SocketAddr, ops::RangeInclusive, path::Path};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::ModelResult,
    supply::{default_epochs, HalvingEpoch, HalvingSchedule},
};

/// Every constant the model uses. Defaults reproduce the published figures;
/// any field can be overridden from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// First block counted for the historical scenario (~2018-01-01).
    pub start_height: i64,
    pub halving_epochs: Vec<HalvingEpoch>,
    /// Genesis block date; elapsed days are measured from here.
    pub origin_date: NaiveDate,
    pub default_exponent: f64,
    /// Average network efficiency, J/TH.
    pub joules_per_th: f64,
    pub blocks_per_day: f64,
    pub days_per_year: f64,
    /// Estimated fee income per block, BTC.
    pub fee_per_block: f64,

    // Forward simulation.
    /// Global hash rate in `projection_first_year`, EH/s.
    pub base_global_hash_eh: f64,
    /// Hash rate bought by one GW of modern hardware, EH/s.
    pub hash_per_gw_eh: f64,
    pub projection_first_year: i32,
    pub projection_last_year: i32,
    /// Year whose midpoint anchors the price calibration.
    pub reference_year: i32,
    pub halving_year: i32,
    /// Years from `halving_year` to the following halving.
    pub halving_interval_years: i32,
    /// Days of `halving_year` mined at the pre-halving reward.
    pub pre_halving_days: f64,
    /// Subsidy in effect at the start of the projection.
    pub projection_block_reward: f64,
    pub min_allocated_power_gw: f64,
    pub min_exponent: f64,
    pub max_exponent: f64,
    pub max_growth_rate: f64,

    // Display helpers.
    pub history_stride: usize,
    pub curve_horizon_days: i64,
    pub curve_step_days: i64,
    pub allowed_share_percents: Vec<u32>,
    pub default_share_percent: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            start_height: 499_500,
            halving_epochs: default_epochs(),
            origin_date: NaiveDate::from_ymd_opt(2009, 1, 3).unwrap_or_default(),
            default_exponent: 5.6,
            joules_per_th: 30.0,
            blocks_per_day: 144.0,
            days_per_year: 365.25,
            fee_per_block: 0.022,
            base_global_hash_eh: 1000.0,
            hash_per_gw_eh: 55.6,
            projection_first_year: 2026,
            projection_last_year: 2032,
            reference_year: 2025,
            halving_year: 2028,
            halving_interval_years: 4,
            pre_halving_days: 121.0,
            projection_block_reward: 3.125,
            min_allocated_power_gw: 0.15,
            min_exponent: 4.0,
            max_exponent: 7.0,
            max_growth_rate: 1.0,
            history_stride: 7,
            curve_horizon_days: 5 * 365,
            curve_step_days: 30,
            allowed_share_percents: vec![1, 2, 3, 5, 10, 15],
            default_share_percent: 10,
        }
    }
}

impl ModelConfig {
    /// Reads JSON overrides; fields absent from the file keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading model config {}", path.display()))?;
        let cfg: ModelConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing model config {}", path.display()))?;
        cfg.schedule().context("model config has an invalid halving schedule")?;
        Ok(cfg)
    }

    pub fn schedule(&self) -> ModelResult<HalvingSchedule> {
        HalvingSchedule::new(self.halving_epochs.clone())
    }

    pub fn projection_years(&self) -> RangeInclusive<i32> {
        self.projection_first_year..=self.projection_last_year
    }
}

/// Settings for the web service, read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub feeds: FeedEndpoints,
    pub refresh_secs: u64,
    pub model: ModelConfig,
}

#[derive(Debug, Clone)]
pub struct FeedEndpoints {
    pub blockstream: String,
    pub coingecko: String,
    pub blockchain_info: String,
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        Self {
            blockstream: "https://blockstream.info/api".to_string(),
            coingecko: "https://api.coingecko.com/api/v3".to_string(),
            blockchain_info: "https://api.blockchain.info".to_string(),
        }
    }
}

impl FeedEndpoints {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            blockstream: std::env::var("BLOCKSTREAM_API").unwrap_or(d.blockstream),
            coingecko: std::env::var("COINGECKO_API").unwrap_or(d.coingecko),
            blockchain_info: std::env::var("BLOCKCHAIN_INFO_API").unwrap_or(d.blockchain_info),
        }
    }
}

impl ServiceConfig {
    /// Call after `dotenvy::dotenv()` so a local `.env` is honoured.
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr: SocketAddr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let refresh_secs = match std::env::var("REFRESH_SECS") {
            Ok(v) => v.parse().context("REFRESH_SECS must be an integer")?,
            Err(_) => 600,
        };

        let model = match std::env::var("MODEL_CONFIG") {
            Ok(path) => ModelConfig::from_file(path)?,
            Err(_) => ModelConfig::default(),
        };

        Ok(Self {
            bind_addr,
            feeds: FeedEndpoints::from_env(),
            refresh_secs,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ModelConfig =
            serde_json::from_str(r#"{ "joules_per_th": 18.0, "halving_year": 2029 }"#).unwrap();
        assert_eq!(cfg.joules_per_th, 18.0);
        assert_eq!(cfg.halving_year, 2029);
        assert_eq!(cfg.halving_interval_years, 4);
        assert_eq!(cfg.start_height, 499_500);
        assert_eq!(cfg.origin_date, NaiveDate::from_ymd_opt(2009, 1, 3).unwrap());
        assert_eq!(cfg.halving_epochs.len(), 3);
    }

    #[test]
    fn default_projection_years() {
        let years: Vec<i32> = ModelConfig::default().projection_years().collect();
        assert_eq!(years, vec![2026, 2027, 2028, 2029, 2030, 2031, 2032]);
    }

    #[test]
    fn from_file_rejects_bad_schedule() {
        let dir = std::env::temp_dir().join(format!("hashshare-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        std::fs::write(
            &path,
            r#"{ "halving_epochs": [
                { "start_height": 0, "end_height": 10, "reward_per_block": 1.0 },
                { "start_height": 10, "end_height": null, "reward_per_block": 2.0 }
            ] }"#,
        )
        .unwrap();
        assert!(ModelConfig::from_file(&path).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
