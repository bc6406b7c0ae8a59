//! cost-runner: headless cost estimate for one microreactor design.
//!
//! Usage:
//!   cost-runner --data-dir ./data --seed 42 --out ./output
//!   cost-runner --data-dir ./data --tracked-csv study.csv --track "Power MWt,Enrichment"
//!   cost-runner --data-dir ./data --samples 1000 --json
//!
//! The data directory holds `params.json`, `cost_database.csv`,
//! `inflation.csv` and (optionally) `economics_parameters.csv`.

use anyhow::Result;
use coa_core::{
    capital::{OCC, TCI},
    config::{CostInputs, NUMBER_OF_SAMPLES},
    engine::CostEngine,
    estimate::CostEstimate,
    lcoe::{AC, LCOE},
    report::{append_tracked_costs, export_detailed, tracked_costs},
    types::CostColumn,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let samples = parse_arg(&args, "--samples", 0u64);
    let json = args.iter().any(|a| a == "--json");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let out_dir = flag_value(&args, "--out").unwrap_or("./output");
    let tracked_csv = flag_value(&args, "--tracked-csv");
    let tracked: Vec<&str> = flag_value(&args, "--track")
        .map(|list| list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if !json {
        println!("Microreactor cost estimate");
        println!("  seed:      {seed}");
        println!("  data_dir:  {data_dir}");
        println!("  out:       {out_dir}");
        println!();
    }

    let (inputs, mut params) = CostInputs::load_with_params(data_dir)?;
    if samples > 0 {
        params.set(NUMBER_OF_SAMPLES, samples as f64);
    }

    let engine = CostEngine::build(seed);
    let estimate = engine.run(&inputs, params)?;

    let record = tracked_costs(&estimate, &tracked);
    if let Some(path) = tracked_csv {
        append_tracked_costs(&record, Path::new(path))?;
    }

    if json {
        let object: serde_json::Map<String, serde_json::Value> = record
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&object)?);
    } else {
        let (estimate_path, params_path) = export_detailed(&estimate, Path::new(out_dir))?;
        print_summary(&estimate);
        println!();
        println!("  estimate:   {}", estimate_path.display());
        println!("  parameters: {}", params_path.display());
    }

    Ok(())
}

fn print_summary(estimate: &CostEstimate) {
    println!("=== COST SUMMARY (${}) ===", estimate.escalation_year);
    println!("  samples:  {}", estimate.samples);
    println!("  {:<6} {:>18} {:>18}", "", "FOAK", "NOAK");
    for account in [OCC, TCI, AC, LCOE] {
        let Some(row) = estimate.row(account) else {
            continue;
        };
        println!(
            "  {:<6} {:>18.1} {:>18.1}",
            account,
            row.cost(CostColumn::Foak),
            row.cost(CostColumn::Noak)
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
