//! Shared fixtures: a small but complete plant catalog and its parameters.

#![allow(dead_code)]

use coa_core::{
    catalog::{Catalog, CatalogRow, CostField},
    config::{CostInputs, EconomicsParameters},
    distribution::DistributionKind,
    escalation::InflationTable,
    params::DesignParams,
    types::AccountId,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A row with no cost terms; its cost comes from rollup or a later stage.
pub fn summary(account: &str, level: u8, title: &str) -> CatalogRow {
    CatalogRow {
        account: AccountId::parse(account),
        level,
        title: title.to_string(),
        ..Default::default()
    }
}

/// A fixed-cost leaf in 2020 dollars that is never escalated.
pub fn fixed(account: &str, level: u8, title: &str, cost: f64, tag: &str) -> CatalogRow {
    CatalogRow {
        fixed_cost: CostField::Value(cost),
        dollar_year: Some(2020),
        cost_type: Some("NA".into()),
        learning_tag: Some(tag.into()),
        ..summary(account, level, title)
    }
}

/// A linear unit-cost leaf: `unit · params[variable]`.
pub fn unit(account: &str, level: u8, title: &str, cost: f64, variable: &str, tag: &str) -> CatalogRow {
    CatalogRow {
        unit_cost: CostField::Value(cost),
        scaling_variable: Some(variable.into()),
        dollar_year: Some(2020),
        cost_type: Some("NA".into()),
        learning_tag: Some(tag.into()),
        ..summary(account, level, title)
    }
}

/// Fixed-cost leaf with a lognormal spread of ±20%.
pub fn uncertain(account: &str, level: u8, title: &str, cost: f64, tag: &str) -> CatalogRow {
    CatalogRow {
        fixed_cost_low: CostField::Value(cost * 0.8),
        fixed_cost_high: CostField::Value(cost * 1.2),
        fixed_cost_distribution: Some(DistributionKind::Lognormal),
        ..fixed(account, level, title, cost, tag)
    }
}

/// Catalog with every account the pipeline writes to.
///
/// FOAK: A11 = 1000, A21 = 5000, A221.12 = 2000, A221.2 = 400 · 20 MWt,
/// A25 = 3000.
pub fn plant_rows() -> Vec<CatalogRow> {
    vec![
        summary("10", 0, "Capitalized Pre-Construction Costs"),
        fixed("11", 1, "Land and Land Rights", 1000.0, "No Learning"),
        summary("20", 0, "Capitalized Direct Costs"),
        fixed("21", 1, "Structures and Improvements", 5000.0, "Factory Other"),
        summary("22", 1, "Reactor Systems"),
        fixed("221.12", 2, "Vessel", 2000.0, "Factory Primary Structure"),
        unit("221.2", 2, "Control Drums", 400.0, "Power MWt", "Factory Drums"),
        fixed("25", 1, "Initial Fuel Inventory", 3000.0, "No Learning"),
        summary("30", 0, "Capitalized Indirect Services Costs"),
        summary("31", 1, "Factory & Field Indirect Costs"),
        summary("32", 1, "Factory & Construction Supervision"),
        summary("40", 0, "Capitalized Owners Cost"),
        summary("50", 0, "Capitalized Supplementary Costs"),
        summary("60", 0, "Capitalized Financial Costs"),
        summary("62", 1, "Interest"),
        summary("70", 0, "Annualized O&M Cost"),
        summary("75", 1, "Scheduled Replacement Cost"),
        summary("78", 1, "Annualized Decommissioning Cost"),
        summary("80", 0, "Annualized Fuel Cost"),
        summary("82", 1, "Fuel"),
    ]
}

pub fn flat_inflation() -> InflationTable {
    let mut table = InflationTable::new();
    for year in 2018..=2024 {
        table.insert(year, "CPI", 1.0);
    }
    table
}

pub fn inputs(rows: Vec<CatalogRow>) -> CostInputs {
    CostInputs {
        catalog:   Catalog::new(rows),
        inflation: flat_inflation(),
        economics: EconomicsParameters::default(),
    }
}

/// Design and economics parameters for a 10 MWe / 20 MWt plant.
pub fn plant_params() -> DesignParams {
    let mut p = DesignParams::new();
    p.set("Escalation Year", 2020);
    p.set("Number of Samples", 1);
    p.set("Power MWt", 20.0);
    p.set("Power MWe", 10.0);
    p.set("Capacity Factor", 0.9);
    p.set("Interest Rate", 0.07);
    p.set("Annual Return", 0.0475);
    p.set("Levelization Period", 60);
    p.set("Construction Duration", 12);
    p.set("Debt To Equity Ratio", 0.5);
    p.set("indirect to direct field-related cost", 0.1);
    p.set("Maintenance to Direct Cost Ratio", 0.015);
    p.set("Fuel Lifetime", 3650);
    p.set("Refueling Period", 0);
    p.set("Startup Duration after Refueling", 0);
    p.set("NOAK Unit Number", 10);
    p.set("No Learning", 0.0);
    p.set("Factory Other", 0.1);
    p.set("Factory Primary Structure", 0.05);
    p.set("Factory Drums", 0.08);
    p
}

pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
