#![deny(warnings)]

//! Headless front end: run a scenario for a number of weeks with a fixed
//! decision batch and print the resulting KPIs.

use anyhow::{bail, Context, Result};
use sim_core::{Decisions, SimConfig};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    scenario: Option<PathBuf>,
    weeks: u32,
    seed: Option<u64>,
    decisions: Decisions,
    json: bool,
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T> {
    let raw = value.with_context(|| format!("{flag} expects a value"))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid value for {flag}: {raw}"))
}

fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<Args> {
    // Dashboard slider defaults
    let mut args = Args {
        scenario: None,
        weeks: 12,
        seed: None,
        decisions: Decisions {
            raw_to_api: 100,
            api_to_finished: 50,
            raw_materials_to_buy: 100,
        },
        json: false,
    };
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = Some(parse_value("--scenario", it.next())?),
            "--weeks" => args.weeks = parse_value("--weeks", it.next())?,
            "--seed" => args.seed = Some(parse_value("--seed", it.next())?),
            "--raw-to-api" => args.decisions.raw_to_api = parse_value("--raw-to-api", it.next())?,
            "--api-to-finished" => {
                args.decisions.api_to_finished = parse_value("--api-to-finished", it.next())?
            }
            "--buy" => args.decisions.raw_materials_to_buy = parse_value("--buy", it.next())?,
            "--json" => args.json = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn load_scenario(path: &Path) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let cfg: SimConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing scenario {}", path.display()))?;
    Ok(cfg)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(git_sha = env!("GIT_SHA"), ?args, "starting CLI");

    let mut cfg = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }
    let mut clock = sim_runtime::SimulationClock::new(cfg)?;
    let (snap, stats) = sim_runtime::run_weeks(&mut clock, args.weeks, &args.decisions);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
        return Ok(());
    }

    println!(
        "Week {} | funds: ${} | profit: ${} | demand: {} units",
        snap.week, snap.funds, snap.profit, snap.demand
    );
    println!(
        "Inventory | raw: {} | api: {} | finished: {}",
        snap.inventory.raw_materials, snap.inventory.api, snap.inventory.finished_products
    );
    if let (Some(t), Some(f)) = (snap.turnover, snap.fill_rate) {
        println!(
            "KPI | turnover: {:.2} ({:+.2}) | OTIF: {:.1}% ({:+.1}%) | revenue: ${}",
            t.mean,
            t.delta.unwrap_or(0.0),
            f.mean * 100.0,
            f.delta.unwrap_or(0.0) * 100.0,
            snap.total_revenue
        );
    }
    println!(
        "Run | weeks: {} | rejected batches: {} | disruptions: {}",
        stats.weeks_run, stats.rejected_batches, stats.disruptions
    );
    if snap.recent_events.is_empty() {
        println!("No events yet");
    }
    for event in &snap.recent_events {
        println!("  {event}");
    }

    Ok(())
}
