use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use reqwest::Client;
use serde_json::json;
use std::{path::PathBuf, time::Duration};
use tracing::{info, warn};

use hashshare::{
    feeds::{fetch_block_height, fetch_hash_rate_ths, fetch_price},
    project, snapshot, AllocationShare, FeedEndpoints, MarketInputs, ModelConfig, ProjectionTable,
    OpportunitySnapshot, SimulationParameters,
};

/// Values used when running without network access (tip, EUR price and
/// hash rate as of 2025-09-29).
const OFFLINE_HEIGHT: i64 = 916_944;
const OFFLINE_PRICE_EUR: f64 = 97_304.0;
const OFFLINE_HASH_RATE_THS: f64 = 6.0e8;

#[derive(Parser, Debug)]
#[command(
    name = "hashshare-report",
    about = "Print the mining opportunity-cost snapshot and projection"
)]
struct Args {
    /// Share of global hash power, in percent (1, 2, 3, 5, 10 or 15)
    #[arg(long, default_value_t = 10)]
    share: u32,

    /// Power allocated to mining in the projection, GW
    #[arg(long, default_value_t = 1.0)]
    gw: f64,

    /// Power-law exponent for the price curve
    #[arg(long, default_value_t = 5.6)]
    exponent: f64,

    /// Annual global hash-rate growth, percent
    #[arg(long, default_value_t = 30.0)]
    growth: f64,

    /// JSON file overriding model constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the network and use the built-in fallback market values
    #[arg(long)]
    offline: bool,

    /// Emit JSON instead of text tables
    #[arg(long)]
    json: bool,
}

async fn market_inputs(offline: bool) -> Result<MarketInputs> {
    if offline {
        info!("offline: using fallback market values");
        return Ok(MarketInputs::complete(OFFLINE_HEIGHT, OFFLINE_PRICE_EUR, OFFLINE_HASH_RATE_THS));
    }

    let http = Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .context("building http client")?;
    let ep = FeedEndpoints::from_env();

    let (height, price, hash_rate) = tokio::join!(
        fetch_block_height(&http, &ep),
        fetch_price(&http, &ep),
        fetch_hash_rate_ths(&http, &ep),
    );

    // leave failed feeds empty; the model reports what is missing
    let mut inputs = MarketInputs::default();
    match height {
        Ok(h) => inputs.block_height = Some(h),
        Err(e) => warn!("block height: {e:#}"),
    }
    match price {
        Ok(p) => inputs.price = Some(p),
        Err(e) => warn!("price: {e:#}"),
    }
    match hash_rate {
        Ok(r) => inputs.hash_rate_ths = Some(r),
        Err(e) => warn!("hash rate: {e:#}"),
    }
    Ok(inputs)
}

fn print_snapshot(s: &OpportunitySnapshot) {
    println!("=== Opportunity cost since block {} ===", s.start_height);
    println!("share of global hash power : {:.0} %", s.share_fraction * 100.0);
    println!("current height             : {}", s.current_height);
    println!("blocks since start         : {}", s.blocks_missed);
    println!("coins emitted since start  : {:.2} BTC", s.total_emitted_coins);
    println!("coins missed               : {:.2} BTC", s.coins_missed);
    println!(
        "value missed               : {} EUR (at {:.0} EUR/BTC)",
        s.euro_value_missed, s.price
    );
    println!("network power              : {:.0} MW", s.power.total_power_megawatts);
    println!("power for this share       : {:.0} MW", s.required_power_mw);
    println!(
        "power law                  : A = {:e}, exponent = {}",
        s.power_law.coefficient(),
        s.power_law.exponent()
    );
    println!();
}

fn print_projection(t: &ProjectionTable) {
    println!(
        "=== Projection: {} GW ({:.1} EH/s), exponent {}, growth {:.0} %/yr ===",
        t.parameters.allocated_power_gw,
        t.allocated_hash_eh,
        t.parameters.price_exponent,
        t.parameters.annual_hash_growth_rate * 100.0
    );
    println!(
        "{:>4} | {:>12} | {:>7} | {:>10} | {:>10} | {:>12}",
        "year", "price EUR", "hash %", "BTC mined", "M EUR", "cum. M EUR"
    );
    for r in &t.rows {
        println!(
            "{:>4} | {:>12.0} | {:>7.2} | {:>10.0} | {:>10.0} | {:>12.0}",
            r.year,
            r.projected_price,
            r.allocation_hash_share_pct,
            r.coins_captured,
            r.revenue / 1e6,
            r.cumulative_revenue / 1e6
        );
    }
    println!(
        "total: {:.0} BTC, {:.0} M EUR",
        t.total_coins_captured,
        t.total_revenue / 1e6
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => ModelConfig::from_file(path)?,
        None => ModelConfig::default(),
    };
    if !cfg.allowed_share_percents.contains(&args.share) {
        anyhow::bail!("--share must be one of {:?}", cfg.allowed_share_percents);
    }

    let inputs = market_inputs(args.offline).await?;
    let share = AllocationShare::from_percent(args.share)?;
    let snap = snapshot(&cfg, &inputs, share, Utc::now().date_naive())
        .context("computing opportunity-cost snapshot")?;

    let params = SimulationParameters::new(args.gw, args.exponent, args.growth / 100.0);
    let table = project(&cfg, &params, snap.price).context("computing projection")?;

    if args.json {
        let out = json!({ "inputs": inputs, "snapshot": snap, "projection": table });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_snapshot(&snap);
        print_projection(&table);
    }
    Ok(())
}
